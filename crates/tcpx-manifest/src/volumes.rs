use serde_yaml::{Mapping, Value};

use crate::document::{sequence_entry, JobManifest};

pub(crate) const LIBRARIES_VOLUME: &str = "libraries";
pub(crate) const TCPX_SOCKET_VOLUME: &str = "tcpx-socket";
pub(crate) const SYS_VOLUME: &str = "sys";
pub(crate) const PROC_SYS_VOLUME: &str = "proc-sys";

/// Host directory GKE installs the NVIDIA driver libraries into.
const NVIDIA_LIB_HOST_DIR: &str = "/home/kubernetes/bin/nvidia/lib64";

/// Append the four volumes the TCPX daemon and the GPU containers mount:
/// the driver library directory, the shared unix-socket scratch space, and
/// read access to `/sys` and `/proc/sys`.
///
/// Volumes are appended, never replaced, so running this twice leaves
/// duplicate entries behind.
pub fn inject_volumes(manifest: &mut JobManifest) {
    let volumes = sequence_entry(manifest.pod_spec(), "volumes");
    volumes.push(host_path_volume(LIBRARIES_VOLUME, NVIDIA_LIB_HOST_DIR));
    volumes.push(empty_dir_volume(TCPX_SOCKET_VOLUME));
    volumes.push(host_path_volume(SYS_VOLUME, "/sys"));
    volumes.push(host_path_volume(PROC_SYS_VOLUME, "/proc/sys"));
}

fn host_path_volume(name: &str, path: &str) -> Value {
    let mut host_path = Mapping::new();
    host_path.insert("path".into(), path.into());

    let mut volume = Mapping::new();
    volume.insert("name".into(), name.into());
    volume.insert("hostPath".into(), Value::Mapping(host_path));
    Value::Mapping(volume)
}

fn empty_dir_volume(name: &str) -> Value {
    let mut volume = Mapping::new();
    volume.insert("name".into(), name.into());
    volume.insert("emptyDir".into(), Value::Mapping(Mapping::new()));
    Value::Mapping(volume)
}

#[cfg(test)]
mod tests {
    use serde_yaml::Sequence;

    use super::*;

    fn volume_names(manifest: &mut JobManifest) -> Vec<String> {
        volumes(manifest)
            .iter()
            .filter_map(|v| v.as_mapping()?.get("name")?.as_str().map(String::from))
            .collect()
    }

    fn volumes(manifest: &mut JobManifest) -> Sequence {
        manifest
            .existing_pod_spec()
            .and_then(|spec| spec.get("volumes"))
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn appends_the_four_volumes_in_order() {
        let mut manifest: JobManifest = "kind: Job\n".parse().unwrap();
        inject_volumes(&mut manifest);

        assert_eq!(
            volume_names(&mut manifest),
            ["libraries", "tcpx-socket", "sys", "proc-sys"]
        );
    }

    #[test]
    fn backs_volumes_with_the_right_sources() {
        let mut manifest: JobManifest = "kind: Job\n".parse().unwrap();
        inject_volumes(&mut manifest);
        let volumes = volumes(&mut manifest);

        let libraries = volumes[0].as_mapping().unwrap();
        assert_eq!(
            libraries
                .get("hostPath")
                .and_then(Value::as_mapping)
                .and_then(|hp| hp.get("path")),
            Some(&Value::from(NVIDIA_LIB_HOST_DIR))
        );

        let socket = volumes[1].as_mapping().unwrap();
        assert!(
            socket.get("emptyDir").is_some_and(Value::is_mapping),
            "tcpx-socket must be ephemeral, not host-backed"
        );
    }

    #[test]
    fn keeps_existing_volumes_ahead_of_the_injected_ones() {
        let input = "\
spec:
  template:
    spec:
      volumes:
        - name: scratch
          emptyDir: {}
";
        let mut manifest: JobManifest = input.parse().unwrap();
        inject_volumes(&mut manifest);

        let names = volume_names(&mut manifest);
        assert_eq!(names.len(), 5);
        assert_eq!(names[0], "scratch");
    }

    #[test]
    fn injecting_twice_duplicates_all_entries() {
        let mut manifest: JobManifest = "kind: Job\n".parse().unwrap();
        inject_volumes(&mut manifest);
        inject_volumes(&mut manifest);

        assert_eq!(volume_names(&mut manifest).len(), 8, "no deduplication on rerun");
    }
}
