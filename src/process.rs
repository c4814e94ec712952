//! Finds a running process by its image name.

use crate::traits::ProcessTable;
use crate::types::ProcessId;
use log::{debug, trace};

/// Return the first process whose image name equals `name`
/// (case-insensitive), or `None` when nothing matches.
///
/// Processes that exit mid-enumeration or whose name cannot be read are
/// skipped.  Only a failure to enumerate the table at all is an error.
pub fn find_running_process<P: ProcessTable + ?Sized>(
    processes: &P,
    name: &str,
) -> Result<Option<ProcessId>, P::Error> {
    let wanted = name.trim().to_lowercase();
    if wanted.is_empty() {
        return Ok(None);
    }
    for pid in processes.process_ids()? {
        match processes.process_name(pid) {
            Ok(image) if image.to_lowercase() == wanted => {
                debug!("{} is running as pid {}", name, pid);
                return Ok(Some(pid));
            }
            Ok(_) => {}
            Err(e) => trace!("skipping pid {}: {}", pid, e),
        }
    }
    Ok(None)
}
