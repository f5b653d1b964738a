use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use crate::error::Error;

pub struct Out {
    prefix: PathBuf,
}

impl Out {
    /// Create a new out writer at `path`.
    ///
    /// # Warning
    ///
    /// When `clean` is set, this recursively removes everything currently at `path`.
    pub fn at(path: impl AsRef<Path>, clean: bool) -> Result<Self, Error> {
        let path = path.as_ref();

        if clean {
            let _ = fs::remove_dir_all(path);
        }
        fs::create_dir_all(path).map_err(|err| Error::io(path, err))?;

        Ok(Out {
            prefix: path.canonicalize().map_err(|err| Error::io(path, err))?,
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Write a file with the given `content` to `out_file`. Recursively creates `out_path` if it or
    /// its directory does not yet exist.
    pub fn update_file(&self, content: &mut impl Read, out_file: impl AsRef<Path>) -> Result<(), Error> {
        let out_file = self.prefix.join(out_file);

        if let Some(parent) = out_file.parent() {
            fs::create_dir_all(parent).map_err(|err| Error::io(parent, err))?;
        }

        let mut fw = File::create(&out_file).map_err(|err| Error::io(&out_file, err))?;
        io::copy(content, &mut fw).map_err(|err| Error::io(&out_file, err))?;

        Ok(())
    }
}
