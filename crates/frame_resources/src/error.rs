pub type FrameResult<T, E = FrameReport> = core::result::Result<T, E>;

/// Error type returned by every fallible operation in this crate.
///
/// Thin wrapper around [`eyre::Report`] so that backend error types which do not
/// satisfy eyre's bounds can still be converted with `?`.
pub struct FrameReport {
    inner: eyre::Report,
}

impl FrameReport {
    /// True when the report was caused by the GPU device being removed.
    pub fn is_device_lost(&self) -> bool {
        self.inner.downcast_ref::<DeviceLost>().is_some()
    }

    pub fn into_report(self) -> eyre::Report {
        self.inner
    }
}

impl From<eyre::Report> for FrameReport {
    fn from(report: eyre::Report) -> Self {
        Self { inner: report }
    }
}

impl From<DeviceLost> for FrameReport {
    fn from(error: DeviceLost) -> Self {
        Self {
            inner: eyre::Report::new(error),
        }
    }
}

impl std::fmt::Display for FrameReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.inner, f)
    }
}

impl std::fmt::Debug for FrameReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(&self.inner, f)
    }
}

impl std::error::Error for FrameReport {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.inner.source()
    }
}

#[cfg(windows)]
impl From<windows::core::Error> for FrameReport {
    fn from(error: windows::core::Error) -> Self {
        Self {
            inner: eyre::Report::new(WrappedWindowsError::from(error)),
        }
    }
}

/// The GPU device was removed while the CPU depended on its progress.
///
/// Fatal: GPU state cannot be recovered in-process, so the session must be torn down.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct DeviceLost {
    /// Fence value the CPU was waiting for, if the loss was observed during a wait.
    pub awaited_value: Option<u64>,
}

impl std::error::Error for DeviceLost {}

impl std::fmt::Display for DeviceLost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.awaited_value {
            Some(value) => write!(f, "GPU device lost while waiting for fence value {value}"),
            None => write!(f, "GPU device lost"),
        }
    }
}

impl std::fmt::Debug for DeviceLost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(self, f)
    }
}

#[cfg(windows)]
pub struct WrappedWindowsError {
    inner: windows::core::Error,
}

#[cfg(windows)]
impl From<windows::core::Error> for WrappedWindowsError {
    fn from(error: windows::core::Error) -> Self {
        Self { inner: error }
    }
}

#[cfg(windows)]
impl std::error::Error for WrappedWindowsError {}

#[cfg(windows)]
impl std::fmt::Display for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}

#[cfg(windows)]
impl std::fmt::Debug for WrappedWindowsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.inner)
    }
}
