//! Fire-and-forget program launch.

use std::path::Path;

use super::ProcessControl;

/// Starts `path` detached. Failures are logged and reported as `false`.
pub fn launch<C: ProcessControl + ?Sized>(control: &C, path: &Path) -> bool {
    match control.start(path) {
        Ok(()) => {
            log::info!("Launched {}", path.display());
            true
        }
        Err(err) => {
            log::warn!("Launch failed for {}: {:#}", path.display(), err);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::fake::FakeProcesses;

    #[test]
    fn reports_success_and_failure_as_bool() {
        let processes = FakeProcesses::new().with_unstartable("/broken/app");
        assert!(launch(&processes, Path::new("/opt/apps/editor")));
        assert!(!launch(&processes, Path::new("/broken/app")));
        assert_eq!(processes.started().len(), 2);
        assert_eq!(processes.running().len(), 1);
    }
}
