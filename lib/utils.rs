//! Small conveniences shared by the library and the binary.

/// Create a directory (and all of its parents) if it doesn't already exist.
///
/// Expands to an expression of type `std::io::Result<()>`.
#[macro_export]
macro_rules! mkdir {
    ( $dir:expr ) => {
        {
            let dir: &std::path::Path = $dir.as_ref();
            if dir.as_os_str().is_empty() || dir.is_dir() {
                Ok(())
            } else {
                std::fs::create_dir_all(dir)
            }
        }
    }
}

/// Write a collection of named arrays to a `.npz` archive.
///
/// Expands to an expression of type [`Result<()>`][crate::error::Result].
/// ```ignore
/// write_npz!(
///     outdir.join("data.npz"),
///     arrays: {
///         "time" => &time,
///         "rho" => &rho,
///     }
/// )?;
/// ```
#[macro_export]
macro_rules! write_npz {
    (
        $outfile:expr,
        arrays: { $( $key:expr => $arr:expr ),+ $(,)? } $(,)?
    ) => {
        (|| -> $crate::error::Result<()> {
            let mut npz
                = ndarray_npy::NpzWriter::new(std::fs::File::create($outfile)?);
            $( npz.add_array($key, $arr)?; )+
            npz.finish()?;
            Ok(())
        })()
    }
}

/// Shorthand for `num_complex::Complex64` literals.
///
/// `c!(r)` is purely real, `c!(i x)` is purely imaginary, and `c!(r, x)` has
/// both parts.
#[macro_export]
macro_rules! c {
    ( i $im:expr ) => {
        num_complex::Complex64::new(0.0, $im)
    };
    ( $re:expr, $im:expr ) => {
        num_complex::Complex64::new($re, $im)
    };
    ( $re:expr ) => {
        num_complex::Complex64::new($re, 0.0)
    };
}

#[cfg(test)]
mod test {
    #[test]
    fn complex_literals() {
        assert_eq!(c!(2.0), num_complex::Complex64::new(2.0, 0.0));
        assert_eq!(c!(i 0.5), num_complex::Complex64::new(0.0, 0.5));
        assert_eq!(c!(1.0, -1.0), num_complex::Complex64::new(1.0, -1.0));
    }

    #[test]
    fn mkdir_nested() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a").join("b");
        mkdir!(dir).unwrap();
        assert!(dir.is_dir());
        // already present
        mkdir!(dir).unwrap();
    }
}
