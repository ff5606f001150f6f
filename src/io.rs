
//! Specialized binary input.
//! Uses the error handling for this crate.

pub use ::std::io::Read;
use lebe::prelude::*;
use crate::error::{Error, Result, UnitResult, IoResult};


/// Keep track of what byte we are at.
/// Used to report where in the file a problem was found.
#[derive(Debug)]
pub struct Tracking<T> {

    /// Do not expose to prevent reading without updating position
    inner: T,

    position: usize,
}

impl<T: Read> Read for Tracking<T> {
    fn read(&mut self, buffer: &mut [u8]) -> IoResult<usize> {
        let count = self.inner.read(buffer)?;
        self.position += count;
        Ok(count)
    }
}

impl<T> Tracking<T> {

    /// If `inner` is a reference, it must never be read directly,
    /// but only through this `Tracking` instance.
    pub fn new(inner: T) -> Self {
        Tracking { inner, position: 0 }
    }

    /// Current number of bytes read.
    pub fn byte_position(&self) -> usize {
        self.position
    }
}


/// Generic trait that defines common binary operations such as reading for this type.
pub trait Data: Sized + Default + Clone {

    /// Number of bytes this would consume in an exr file.
    const BYTE_SIZE: usize = ::std::mem::size_of::<Self>();

    /// Read a value of type `Self`.
    fn read(read: &mut impl Read) -> Result<Self>;

    /// Read as many values of type `Self` as fit into the specified slice.
    /// If the slice cannot be filled completely, returns `Error::UnexpectedEndOfStream`.
    fn read_slice(read: &mut impl Read, slice: &mut[Self]) -> UnitResult;

    /// Read as many values of type `Self` as specified with `data_size`.
    ///
    /// This method will not allocate more memory than `soft_max` at once.
    /// If `hard_max` is specified, it will never read any more than that.
    /// Returns `Error::UnexpectedEndOfStream` if reader does not contain the desired number of elements.
    #[inline]
    fn read_vec(read: &mut impl Read, data_size: usize, soft_max: usize, hard_max: Option<usize>, purpose: &'static str) -> Result<Vec<Self>> {
        let mut vec = Vec::new();
        Self::read_into_vec(read, &mut vec, data_size, soft_max, hard_max, purpose)?;
        Ok(vec)
    }

    /// Read as many values of type `Self` as specified with `data_size` into the provided vector.
    ///
    /// This method will not allocate more memory than `soft_max` at once.
    /// If `hard_max` is specified, it will never read any more than that.
    #[inline]
    fn read_into_vec(read: &mut impl Read, data: &mut Vec<Self>, data_size: usize, soft_max: usize, hard_max: Option<usize>, purpose: &'static str) -> UnitResult {
        if let Some(max) = hard_max {
            if data_size > max {
                return Err(Error::malformed(purpose))
            }
        }

        let soft_max = hard_max.unwrap_or(soft_max).min(soft_max).max(1);
        let end = data.len() + data_size;

        // do not allocate more than $chunks memory at once
        // (most of the time, this loop will run only once)
        while data.len() < end {
            let chunk_start = data.len();
            let chunk_end = (chunk_start + soft_max).min(end);

            data.resize(chunk_end, Self::default());
            Self::read_slice(read, &mut data[chunk_start .. chunk_end])?; // safe because of `min(end)`
        }

        Ok(())
    }
}


macro_rules! implement_data_for_primitive {
    ($kind: ident) => {
        impl Data for $kind {
            #[inline]
            fn read(read: &mut impl Read) -> Result<Self> {
                Ok(read.read_from_little_endian()?)
            }

            #[inline]
            fn read_slice(read: &mut impl Read, slice: &mut [Self]) -> UnitResult {
                read.read_from_little_endian_into(slice)?;
                Ok(())
            }
        }
    };
}

implement_data_for_primitive!(u8);
implement_data_for_primitive!(i32);
implement_data_for_primitive!(u32);
implement_data_for_primitive!(f32);
implement_data_for_primitive!(f64);


#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn little_endian_primitives(){
        let bytes: &[u8] = &[
            0x76, 0x2f, 0x31, 0x01,
            0xff, 0xff, 0xff, 0xff,
            0x00, 0x00, 0x80, 0x3f,
        ];

        let read = &mut &bytes[..];
        assert_eq!(i32::read(read).unwrap(), 20000630);
        assert_eq!(u32::read(read).unwrap(), u32::MAX);
        assert_eq!(f32::read(read).unwrap(), 1.0);
        assert!(matches!(u8::read(read), Err(Error::UnexpectedEndOfStream)));
    }

    #[test]
    fn read_vec_in_small_chunks(){
        let bytes: Vec<u8> = (0 .. 100).collect();
        let values = u8::read_vec(&mut bytes.as_slice(), 100, 7, None, "test").unwrap();
        assert_eq!(values, bytes);

        let too_many = u8::read_vec(&mut bytes.as_slice(), 101, 7, None, "test");
        assert!(matches!(too_many, Err(Error::UnexpectedEndOfStream)));

        let over_limit = u8::read_vec(&mut bytes.as_slice(), 50, 7, Some(20), "test");
        assert!(matches!(over_limit, Err(Error::Malformed(_))));
    }

    #[test]
    fn tracking_counts_bytes(){
        let bytes: &[u8] = &[1, 2, 3, 4, 5, 6];
        let mut tracking = Tracking::new(bytes);

        u8::read(&mut tracking).unwrap();
        assert_eq!(tracking.byte_position(), 1);

        i32::read(&mut tracking).unwrap();
        assert_eq!(tracking.byte_position(), 5);

        assert!(matches!(i32::read(&mut tracking), Err(Error::UnexpectedEndOfStream)));
    }
}
