use crate::error::Error;

/// How a class of reference problem is handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    Ignore,
    Info,
    Warn,
    Error,
}

/// Applies validation modes to reference problems as they are found. Problems in `error` mode
/// abort immediately; lesser modes are logged and the build continues.
#[derive(Debug, Default)]
pub struct Report {
    strict: bool,
    warnings: usize,
}

impl Report {
    /// In strict mode warnings abort too.
    pub fn new(strict: bool) -> Self {
        Report { strict, warnings: 0 }
    }

    pub fn raise(&mut self, mode: ValidationMode, problem: Error) -> Result<(), Error> {
        let mode = if self.strict && mode == ValidationMode::Warn {
            ValidationMode::Error
        } else {
            mode
        };

        match mode {
            ValidationMode::Ignore => log::debug!("{problem}"),
            ValidationMode::Info => log::info!("{problem}"),
            ValidationMode::Warn => {
                self.warnings += 1;
                log::warn!("{problem}");
            }
            ValidationMode::Error => return Err(problem),
        }

        Ok(())
    }

    pub fn warnings(&self) -> usize {
        self.warnings
    }
}

#[cfg(test)]
mod test {
    use super::{Report, ValidationMode};
    use crate::error::Error;

    fn problem() -> Error {
        Error::BrokenNavLink {
            title: None,
            path: "reference/missing.md".to_owned(),
        }
    }

    #[test]
    fn modes() {
        let mut report = Report::new(false);
        assert!(report.raise(ValidationMode::Ignore, problem()).is_ok());
        assert!(report.raise(ValidationMode::Info, problem()).is_ok());
        assert!(report.raise(ValidationMode::Warn, problem()).is_ok());
        assert_eq!(report.warnings(), 1);
        assert!(matches!(
            report.raise(ValidationMode::Error, problem()),
            Err(Error::BrokenNavLink { .. })
        ));
    }

    #[test]
    fn strict_promotes_warnings() {
        let mut report = Report::new(true);
        assert!(report.raise(ValidationMode::Info, problem()).is_ok());
        assert!(report.raise(ValidationMode::Warn, problem()).is_err());
        assert_eq!(report.warnings(), 0);
    }

    #[test]
    fn parse_mode() {
        let mode: ValidationMode = serde_yaml::from_str("warn").unwrap();
        assert_eq!(mode, ValidationMode::Warn);
        assert!(serde_yaml::from_str::<ValidationMode>("loud").is_err());
    }
}
