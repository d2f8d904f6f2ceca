use serde_yaml::{Mapping, Value};

use crate::container::{env_var, volume_mount, NVIDIA_LIB_MOUNT};
use crate::document::{sequence_entry, JobManifest};
use crate::volumes::{LIBRARIES_VOLUME, TCPX_SOCKET_VOLUME};

const GPU_RESOURCE: &str = "nvidia.com/gpu";

/// Mount point for the TCPX unix sockets inside GPU containers.
const SOCKET_MOUNT: &str = "/tmp";

/// Wire every GPU-requesting container up to the daemon: one
/// `LD_LIBRARY_PATH` entry and mounts for the socket and driver-library
/// volumes.
///
/// Every container currently in the list is scanned, the freshly prepended
/// sidecar included; it requests no GPUs and so passes through untouched.
/// Containers without a positive `nvidia.com/gpu` limit only gain empty
/// `env`/`volumeMounts` lists when those were missing. This pass never
/// creates the `spec.template.spec` path itself.
pub fn patch_gpu_containers(manifest: &mut JobManifest) {
    let Some(pod_spec) = manifest.existing_pod_spec() else {
        return;
    };
    let Some(containers) = pod_spec.get_mut("containers").and_then(Value::as_sequence_mut)
    else {
        return;
    };

    for container in containers {
        let Some(container) = container.as_mapping_mut() else {
            continue;
        };
        let requests_gpu = requests_gpu(container);

        let env = sequence_entry(container, "env");
        if requests_gpu {
            env.push(env_var("LD_LIBRARY_PATH", NVIDIA_LIB_MOUNT));
        }

        let mounts = sequence_entry(container, "volumeMounts");
        if requests_gpu {
            mounts.push(volume_mount(TCPX_SOCKET_VOLUME, SOCKET_MOUNT));
            mounts.push(volume_mount(LIBRARIES_VOLUME, NVIDIA_LIB_MOUNT));
        }
    }
}

/// True iff `resources.limits` carries a numeric `nvidia.com/gpu` strictly
/// above zero. Missing levels, a zero count, or a non-numeric quantity all
/// read as "no GPUs".
fn requests_gpu(container: &Mapping) -> bool {
    container
        .get("resources")
        .and_then(Value::as_mapping)
        .and_then(|resources| resources.get("limits"))
        .and_then(Value::as_mapping)
        .and_then(|limits| limits.get(GPU_RESOURCE))
        .and_then(Value::as_f64)
        .is_some_and(|count| count > 0.0)
}
