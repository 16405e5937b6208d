//! Binary Codec
//! ---
//! Primitive encoders and decoders plus the `Writable` trait every container, pair and
//! record implements.  All fixed-width values are big-endian.  Lengths and entry counts
//! use a zero-compressed variable-length integer: values in `[-112, 127]` occupy a single
//! byte; anything else is a marker byte carrying the sign and the number of payload bytes,
//! followed by the magnitude (one's-complemented when negative), most significant byte
//! first.
//!
//! Every container is framed as
//!
//! ```text
//! Container := VarInt(entryCount) (Key Value)*
//! ```

use std::io::{Read, Write};

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::error::{Error, Result};

/// Types with a stable, self-delimiting binary form.
pub trait Writable: Sized {

    /// Writes the value to the byte sink.
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()>;

    /// Reads a value back from the byte source.
    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self>;

    /// Serializes the value into a fresh buffer.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(buf)
    }

    /// Creates a value from a buffer produced by `to_bytes`.  The buffer must hold exactly
    /// one value.
    /// ```rust
    ///   use tally::codec::Writable;
    ///
    ///   let bytes = "héllo".to_owned().to_bytes().unwrap();
    ///   assert_eq!(String::from_bytes(&bytes).unwrap(), "héllo");
    ///   assert!(String::from_bytes(&bytes[..3]).is_err());
    /// ```
    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut cursor = bytes;
        let value = Self::read_from(&mut cursor)?;
        if cursor.is_empty() {
            Ok(value)
        } else {
            Err(Error::malformed(format!("{} trailing bytes after value", cursor.len())))
        }
    }
}

fn is_negative_marker(first: i8) -> bool {
    first < -120 || (first >= -112 && first < 0)
}

/// Number of bytes, marker included, a var-int starting with `first` occupies.
pub fn vint_size(first: i8) -> usize {
    let first = first as i32;
    if first >= -112 {
        1
    } else if first < -120 {
        (-119 - first) as usize
    } else {
        (-111 - first) as usize
    }
}

/// Writes a 64-bit signed integer in the zero-compressed var-int form.
pub fn write_vlong<W: Write + ?Sized>(out: &mut W, value: i64) -> Result<()> {
    if value >= -112 && value <= 127 {
        out.write_i8(value as i8)?;
        return Ok(());
    }

    let (magnitude, mut marker) = if value < 0 {
        (!value, -120i32)
    } else {
        (value, -112i32)
    };

    let mut tmp = magnitude;
    while tmp != 0 {
        tmp >>= 8;
        marker -= 1;
    }
    out.write_i8(marker as i8)?;

    let len = if marker < -120 { -(marker + 120) } else { -(marker + 112) };
    for idx in (0..len).rev() {
        out.write_u8((magnitude >> (idx * 8)) as u8)?;
    }
    Ok(())
}

/// Reads a 64-bit var-int.
pub fn read_vlong<R: Read + ?Sized>(input: &mut R) -> Result<i64> {
    let first = input.read_i8()?;
    let len = vint_size(first);
    if len == 1 {
        return Ok(first as i64);
    }

    let mut value = 0i64;
    for _ in 0..len - 1 {
        value = (value << 8) | input.read_u8()? as i64;
    }
    Ok(if is_negative_marker(first) { !value } else { value })
}

/// Writes a 32-bit signed integer as a var-int.
/// ```rust
///   use tally::codec::{write_vint, read_vint};
///
///   let mut buf = Vec::new();
///   write_vint(&mut buf, 5).unwrap();
///   write_vint(&mut buf, -1_000_000).unwrap();
///   assert_eq!(buf.len(), 1 + 4);
///
///   let mut source = &buf[..];
///   assert_eq!(read_vint(&mut source).unwrap(), 5);
///   assert_eq!(read_vint(&mut source).unwrap(), -1_000_000);
/// ```
pub fn write_vint<W: Write + ?Sized>(out: &mut W, value: i32) -> Result<()> {
    write_vlong(out, value as i64)
}

/// Reads a var-int that must fit in 32 bits.
pub fn read_vint<R: Read + ?Sized>(input: &mut R) -> Result<i32> {
    let value = read_vlong(input)?;
    if value < i32::min_value() as i64 || value > i32::max_value() as i64 {
        Err(Error::malformed(format!("var-int {} does not fit in 32 bits", value)))
    } else {
        Ok(value as i32)
    }
}

/// Writes a non-negative length or count.
pub fn write_len<W: Write + ?Sized>(out: &mut W, len: usize) -> Result<()> {
    if len > i32::max_value() as usize {
        return Err(Error::malformed(format!("length {} exceeds the var-int range", len)));
    }
    write_vint(out, len as i32)
}

/// Reads a length or count written by `write_len`.
pub fn read_len<R: Read + ?Sized>(input: &mut R) -> Result<usize> {
    let len = read_vint(input)?;
    if len < 0 {
        Err(Error::malformed(format!("negative length {}", len)))
    } else {
        Ok(len as usize)
    }
}

/// Writes a 4-byte IEEE-754 float.
pub fn write_f32<W: Write + ?Sized>(out: &mut W, value: f32) -> Result<()> {
    out.write_f32::<BigEndian>(value)?;
    Ok(())
}

/// Reads a 4-byte IEEE-754 float, bit for bit.
pub fn read_f32<R: Read + ?Sized>(input: &mut R) -> Result<f32> {
    Ok(input.read_f32::<BigEndian>()?)
}

/// Writes a UTF-8 string prefixed by its byte length.
pub fn write_string<W: Write + ?Sized>(out: &mut W, value: &str) -> Result<()> {
    write_len(out, value.len())?;
    out.write_all(value.as_bytes())?;
    Ok(())
}

/// Reads a length-prefixed UTF-8 string.
pub fn read_string<R: Read + ?Sized>(input: &mut R) -> Result<String> {
    let len = read_len(input)?;
    let bytes = read_exact_vec(input, len)?;
    Ok(String::from_utf8(bytes)?)
}

/// Reads exactly `len` bytes without trusting `len` for the allocation.
pub(crate) fn read_exact_vec<R: Read + ?Sized>(input: &mut R, len: usize) -> Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(len.min(64 * 1024));
    input.take(len as u64).read_to_end(&mut bytes)?;
    if bytes.len() < len {
        return Err(Error::Truncated);
    }
    Ok(bytes)
}

/// Writes a container frame: the entry count followed by each key/value pair in the order
/// the iterator yields them.
pub fn write_container<'a, W, K, V, I>(out: &mut W, len: usize, entries: I) -> Result<()>
where
    W: Write + ?Sized,
    K: 'a + Writable,
    V: 'a + Writable,
    I: IntoIterator<Item = (&'a K, &'a V)>
{
    write_len(out, len)?;
    let mut written = 0usize;
    for (k, v) in entries {
        k.write_to(out)?;
        v.write_to(out)?;
        written += 1;
    }
    if written != len {
        return Err(Error::malformed(
            format!("container announced {} entries but yielded {}", len, written)));
    }
    Ok(())
}

/// Reads a container frame, handing each decoded entry to `insert`.  Returns the number
/// of entries read.
pub fn read_container<R, K, V, F>(input: &mut R, mut insert: F) -> Result<usize>
where
    R: Read + ?Sized,
    K: Writable,
    V: Writable,
    F: FnMut(K, V) -> Result<()>
{
    let len = read_len(input)?;
    for _ in 0..len {
        let k = K::read_from(input)?;
        let v = V::read_from(input)?;
        insert(k, v)?;
    }
    Ok(len)
}

impl Writable for i32 {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        out.write_i32::<BigEndian>(*self)?;
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        Ok(input.read_i32::<BigEndian>()?)
    }
}

impl Writable for i64 {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        out.write_i64::<BigEndian>(*self)?;
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        Ok(input.read_i64::<BigEndian>()?)
    }
}

impl Writable for f32 {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_f32(out, *self)
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        read_f32(input)
    }
}

impl Writable for f64 {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        out.write_f64::<BigEndian>(*self)?;
        Ok(())
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        Ok(input.read_f64::<BigEndian>()?)
    }
}

impl Writable for String {
    fn write_to<W: Write + ?Sized>(&self, out: &mut W) -> Result<()> {
        write_string(out, self)
    }

    fn read_from<R: Read + ?Sized>(input: &mut R) -> Result<Self> {
        read_string(input)
    }
}

#[cfg(test)]
mod codec_test {
    use super::*;

    fn vlong_bytes(v: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        write_vlong(&mut buf, v).unwrap();
        buf
    }

    #[test]
    fn test_vint_boundaries() {
        let values = [0, 1, -1, 127, 128, -112, -113, 255, 256, -256, -257,
                      65_535, 65_536, i32::max_value(), i32::min_value()];
        for v in values.iter() {
            let mut buf = Vec::new();
            write_vint(&mut buf, *v).unwrap();
            assert_eq!(buf.len(), vint_size(buf[0] as i8), "size mismatch for {}", v);
            let mut source = &buf[..];
            assert_eq!(read_vint(&mut source).unwrap(), *v);
            assert!(source.is_empty());
        }
    }

    #[test]
    fn test_vint_sizes() {
        assert_eq!(vlong_bytes(127).len(), 1);
        assert_eq!(vlong_bytes(-112).len(), 1);
        assert_eq!(vlong_bytes(128).len(), 2);
        assert_eq!(vlong_bytes(-113).len(), 2);
        assert_eq!(vlong_bytes(i32::max_value() as i64).len(), 5);
        assert_eq!(vlong_bytes(i64::max_value()).len(), 9);
        assert_eq!(vlong_bytes(i64::min_value()).len(), 9);
    }

    #[test]
    fn test_vint_known_bytes() {
        assert_eq!(vlong_bytes(128), vec![0x8f, 0x80]);
        assert_eq!(vlong_bytes(-129), vec![0x87, 0x80]);
        assert_eq!(vlong_bytes(300), vec![0x8e, 0x01, 0x2c]);
    }

    #[test]
    fn test_read_vint_rejects_wide_values() {
        let buf = vlong_bytes(1i64 << 40);
        let mut source = &buf[..];
        match read_vint(&mut source) {
            Err(Error::Malformed(_)) => (),
            other => panic!("expected malformed, got {:?}", other)
        }
    }

    #[test]
    fn test_truncated_vint() {
        let buf = vlong_bytes(1_000_000);
        let mut source = &buf[..2];
        assert!(read_vlong(&mut source).unwrap_err().is_truncated());
    }

    #[test]
    fn test_fixed_width_is_big_endian() {
        assert_eq!(258i32.to_bytes().unwrap(), vec![0, 0, 1, 2]);
        assert_eq!(1.0f32.to_bytes().unwrap(), vec![0x3f, 0x80, 0, 0]);
        assert_eq!((-2i64).to_bytes().unwrap(), vec![0xff; 7].into_iter().chain(Some(0xfe)).collect::<Vec<u8>>());
    }

    #[test]
    fn test_float_bits_survive() {
        for v in [0.1f32, -0.0, f32::MIN_POSITIVE, f32::INFINITY, 1e-45].iter() {
            let back = f32::from_bytes(&v.to_bytes().unwrap()).unwrap();
            assert_eq!(back.to_bits(), v.to_bits());
        }
        let nan = f32::from_bytes(&std::f32::NAN.to_bytes().unwrap()).unwrap();
        assert!(nan.is_nan());
    }

    #[test]
    fn test_string_prefix_is_byte_length() {
        let s = "日本語".to_owned();
        let bytes = s.to_bytes().unwrap();
        assert_eq!(bytes[0], 9);
        assert_eq!(bytes.len(), 10);
        assert_eq!(String::from_bytes(&bytes).unwrap(), s);
    }

    #[test]
    fn test_string_errors() {
        let mut bad = Vec::new();
        write_len(&mut bad, 2).unwrap();
        bad.extend_from_slice(&[0xc3, 0x28]);
        match String::from_bytes(&bad) {
            Err(Error::Utf8(_)) => (),
            other => panic!("expected utf8 error, got {:?}", other)
        }

        let mut short = Vec::new();
        write_len(&mut short, 10).unwrap();
        short.extend_from_slice(b"abc");
        assert!(String::from_bytes(&short).unwrap_err().is_truncated());

        let mut negative = Vec::new();
        write_vint(&mut negative, -4).unwrap();
        assert!(String::from_bytes(&negative).is_err());
    }

    #[test]
    fn test_container_frame() {
        let keys = vec![1i32, 2, 3];
        let values = vec![10i32, 20, 30];
        let mut buf = Vec::new();
        write_container(&mut buf, 3, keys.iter().zip(values.iter())).unwrap();
        assert_eq!(buf.len(), 1 + 3 * 8);

        let mut out = Vec::new();
        let n = read_container(&mut &buf[..], |k: i32, v: i32| {
            out.push((k, v));
            Ok(())
        }).unwrap();
        assert_eq!(n, 3);
        assert_eq!(out, vec![(1, 10), (2, 20), (3, 30)]);

        let cut = &buf[..buf.len() - 2];
        let res = read_container(&mut &cut[..], |_k: i32, _v: i32| Ok(()));
        assert!(res.unwrap_err().is_truncated());
    }

    #[test]
    fn test_container_count_mismatch() {
        let keys = vec![1i32];
        let values = vec![1i32];
        let mut buf = Vec::new();
        assert!(write_container(&mut buf, 2, keys.iter().zip(values.iter())).is_err());
    }
}
