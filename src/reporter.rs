use crate::AppResult;
use console::{Style, Term};
use indicatif::ProgressBar;

/// Progress and warning messages for the user, written above a running spinner
/// when there is one so the two don't interleave.
#[derive(Debug, Clone)]
pub struct AppReporter<'a> {
    inner: AppReporterInner<'a>,
}

impl<'a> AppReporter<'a> {
    pub fn report<S>(&self, message: S) -> AppResult<()>
    where
        S: AsRef<str>,
    {
        tracing::info!("{}", message.as_ref());
        self.write_line(message.as_ref())
    }

    pub fn warn<S>(&self, message: S) -> AppResult<()>
    where
        S: AsRef<str>,
    {
        tracing::warn!("{}", message.as_ref());
        self.write_line(
            format!(
                "{}: {}",
                Style::new().bold().yellow().apply_to("Warning"),
                message.as_ref()
            )
            .as_str(),
        )
    }

    fn write_line(&self, message: &str) -> AppResult<()> {
        match &self.inner {
            AppReporterInner::Term(term) => Ok(term.write_line(message)?),
            AppReporterInner::ProgressBar(progress_bar) => {
                progress_bar.println(message);
                Ok(())
            }
        }
    }
}

#[derive(Debug, Clone)]
enum AppReporterInner<'a> {
    Term(&'a Term),
    ProgressBar(&'a ProgressBar),
}

impl<'a> From<&'a Term> for AppReporter<'a> {
    fn from(term: &'a Term) -> Self {
        AppReporter {
            inner: AppReporterInner::Term(term),
        }
    }
}

impl<'a> From<&'a ProgressBar> for AppReporter<'a> {
    fn from(progress_bar: &'a ProgressBar) -> Self {
        AppReporter {
            inner: AppReporterInner::ProgressBar(progress_bar),
        }
    }
}
