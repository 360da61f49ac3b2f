//! Fallible allocation for intermediate buffers.

use crate::util::{FastNmsError, FastNmsResult};

/// Allocates an empty vector with room for `capacity` elements.
///
/// Allocation failure is reported as `ResourceExhausted` instead of aborting.
pub(crate) fn try_with_capacity<T>(capacity: usize, buffer: &'static str) -> FastNmsResult<Vec<T>> {
    let mut out = Vec::new();
    out.try_reserve_exact(capacity)
        .map_err(|_| FastNmsError::ResourceExhausted {
            buffer,
            requested: capacity,
        })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::try_with_capacity;
    use crate::util::FastNmsError;

    #[test]
    fn reserves_requested_capacity() {
        let buf: Vec<u64> = try_with_capacity(32, "test").unwrap();
        assert!(buf.capacity() >= 32);
        assert!(buf.is_empty());
    }

    #[test]
    fn impossible_reservation_is_resource_exhausted() {
        let err = try_with_capacity::<u64>(usize::MAX, "huge").unwrap_err();
        assert_eq!(
            err,
            FastNmsError::ResourceExhausted {
                buffer: "huge",
                requested: usize::MAX,
            }
        );
    }
}
