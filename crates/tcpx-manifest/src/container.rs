//! Builders for the container sub-nodes shared by the sidecar and GPU passes.

use serde_yaml::{Mapping, Value};

/// Mount path under which both the daemon and the GPU containers see the
/// host's NVIDIA driver libraries.
pub(crate) const NVIDIA_LIB_MOUNT: &str = "/usr/local/nvidia/lib64";

/// A `name`/`value` entry for a container `env` list.
pub(crate) fn env_var(name: &str, value: &str) -> Value {
    let mut env = Mapping::new();
    env.insert("name".into(), name.into());
    env.insert("value".into(), value.into());
    Value::Mapping(env)
}

/// A `name`/`mountPath` entry for a container `volumeMounts` list.
pub(crate) fn volume_mount(name: &str, mount_path: &str) -> Value {
    let mut mount = Mapping::new();
    mount.insert("name".into(), name.into());
    mount.insert("mountPath".into(), mount_path.into());
    Value::Mapping(mount)
}
