/// Macro for handling `Result<T, E>` in functions that return `Option<Result<T, E>>`.
///
/// - If `expr` evaluates to `Ok(t)`, the macro yields `t`.
/// - If `expr` evaluates to `Err(e)`, the macro causes the enclosing function to
///   return `Some(Err(e))`.
///
/// Used by `next()` of iterators over cursor output, where the underlying
/// positioning call is fallible.
#[macro_export]
macro_rules! try_or_ret_some_err {
    ($expr:expr) => {
        match $expr {
            Ok(value) => value,
            Err(err) => {
                return Some(Err(err));
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::{Result, error::Error};

    struct Countdown(u32);

    impl Iterator for Countdown {
        type Item = Result<u32>;

        fn next(&mut self) -> Option<Self::Item> {
            let value = try_or_ret_some_err!(if self.0 == 1 {
                Err(Error::invalid_operation("countdown"))
            } else {
                Ok(self.0)
            });
            if value == 0 {
                return None;
            }
            self.0 -= 1;
            Some(Ok(value))
        }
    }

    #[test]
    fn test_try_or_ret_some_err() {
        let mut it = Countdown(2);
        assert_eq!(it.next().unwrap().unwrap(), 2);
        assert!(it.next().unwrap().is_err());
    }
}
