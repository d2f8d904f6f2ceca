use serde_yaml::{Mapping, Value};

use crate::container::{env_var, volume_mount, NVIDIA_LIB_MOUNT};
use crate::document::{sequence_entry, JobManifest};
use crate::volumes::{LIBRARIES_VOLUME, PROC_SYS_VOLUME, SYS_VOLUME, TCPX_SOCKET_VOLUME};

pub(crate) const DAEMON_NAME: &str = "tcpx-daemon";

const RXDM_IMAGE_REPO: &str =
    "us-docker.pkg.dev/gce-ai-infra/gpudirect-tcpx/tcpgpudmarxd-dev";

/// Unix socket directory shared between the daemon and the GPU containers.
const UDS_PATH: &str = "/run/tcpx";

/// RxDM invocation for A3 machines. The escaped quotes around the
/// `--setup_param` value are part of the argument the daemon expects.
const RXDM_COMMAND: [&str; 9] = [
    "/tcpgpudmarxd/build/app/tcpgpudmarxd",
    "--gpu_nic_preset",
    "a3vm",
    "--gpu_shmem_type",
    "fd",
    "--uds_path",
    UDS_PATH,
    "--setup_param",
    "\\\"--verbose 128 2 0 \\\"",
];

/// Insert the RxDM receive-datapath-manager sidecar at the head of
/// `spec.template.spec.containers`.
///
/// `rxdm_version` is formatted into the image tag verbatim; an invalid
/// version only surfaces when the cluster tries to pull the image. Each
/// call prepends another sidecar, so this is deliberately not idempotent.
pub fn inject_sidecar(manifest: &mut JobManifest, rxdm_version: &str) {
    let containers = sequence_entry(manifest.pod_spec(), "containers");
    containers.insert(0, daemon_container(rxdm_version));
}

fn daemon_container(rxdm_version: &str) -> Value {
    let mut container = Mapping::new();
    container.insert("name".into(), DAEMON_NAME.into());
    container.insert(
        "image".into(),
        format!("{RXDM_IMAGE_REPO}:{rxdm_version}").into(),
    );
    container.insert("imagePullPolicy".into(), "Always".into());
    container.insert(
        "command".into(),
        Value::Sequence(RXDM_COMMAND.iter().copied().map(Value::from).collect()),
    );
    container.insert("securityContext".into(), net_admin_context());
    container.insert(
        "volumeMounts".into(),
        Value::Sequence(vec![
            volume_mount(LIBRARIES_VOLUME, NVIDIA_LIB_MOUNT),
            volume_mount(TCPX_SOCKET_VOLUME, UDS_PATH),
            volume_mount(SYS_VOLUME, "/hostsysfs"),
            volume_mount(PROC_SYS_VOLUME, "/hostprocsysfs"),
        ]),
    );
    container.insert(
        "env".into(),
        Value::Sequence(vec![env_var("LD_LIBRARY_PATH", NVIDIA_LIB_MOUNT)]),
    );
    Value::Mapping(container)
}

/// The daemon rewrites flow-steering rules, so it needs NET_ADMIN.
fn net_admin_context() -> Value {
    let mut capabilities = Mapping::new();
    capabilities.insert("add".into(), Value::Sequence(vec!["NET_ADMIN".into()]));

    let mut context = Mapping::new();
    context.insert("capabilities".into(), Value::Mapping(capabilities));
    Value::Mapping(context)
}

#[cfg(test)]
mod tests {
    use serde_yaml::Sequence;

    use super::*;

    fn containers(manifest: &mut JobManifest) -> Sequence {
        manifest
            .existing_pod_spec()
            .and_then(|spec| spec.get("containers"))
            .and_then(Value::as_sequence)
            .cloned()
            .unwrap_or_default()
    }

    #[test]
    fn formats_the_version_into_the_image_tag() {
        let mut manifest: JobManifest = "kind: Job\n".parse().unwrap();
        inject_sidecar(&mut manifest, "v1.2.3");

        let containers = containers(&mut manifest);
        let daemon = containers[0].as_mapping().unwrap();
        assert_eq!(
            daemon.get("image"),
            Some(&Value::from(
                "us-docker.pkg.dev/gce-ai-infra/gpudirect-tcpx/tcpgpudmarxd-dev:v1.2.3"
            ))
        );
    }

    #[test]
    fn prepends_ahead_of_existing_containers() {
        let input = "\
spec:
  template:
    spec:
      containers:
        - name: main
          image: busybox
";
        let mut manifest: JobManifest = input.parse().unwrap();
        inject_sidecar(&mut manifest, "v2.0.12");

        let containers = containers(&mut manifest);
        assert_eq!(containers.len(), 2);
        assert_eq!(
            containers[0].as_mapping().unwrap().get("name"),
            Some(&Value::from(DAEMON_NAME))
        );
        assert_eq!(
            containers[1].as_mapping().unwrap().get("name"),
            Some(&Value::from("main")),
            "existing containers shift back by one"
        );
    }

    #[test]
    fn daemon_command_and_mounts_are_complete() {
        let mut manifest: JobManifest = "kind: Job\n".parse().unwrap();
        inject_sidecar(&mut manifest, "v2.0.12");

        let containers = containers(&mut manifest);
        let daemon = containers[0].as_mapping().unwrap();

        let command = daemon.get("command").and_then(Value::as_sequence).unwrap();
        assert_eq!(command.len(), 9);
        assert_eq!(command[0], Value::from("/tcpgpudmarxd/build/app/tcpgpudmarxd"));
        assert_eq!(command[8], Value::from("\\\"--verbose 128 2 0 \\\""));

        let mounts = daemon.get("volumeMounts").and_then(Value::as_sequence).unwrap();
        let mount_names: Vec<&str> = mounts
            .iter()
            .filter_map(|m| m.as_mapping()?.get("name")?.as_str())
            .collect();
        assert_eq!(mount_names, ["libraries", "tcpx-socket", "sys", "proc-sys"]);

        let capabilities = daemon
            .get("securityContext")
            .and_then(Value::as_mapping)
            .and_then(|sc| sc.get("capabilities"))
            .and_then(Value::as_mapping)
            .and_then(|caps| caps.get("add"))
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(capabilities, &vec![Value::from("NET_ADMIN")]);
    }

    #[test]
    fn injecting_twice_stacks_sidecars() {
        let mut manifest: JobManifest = "kind: Job\n".parse().unwrap();
        inject_sidecar(&mut manifest, "v2.0.12");
        inject_sidecar(&mut manifest, "v2.0.12");

        let containers = containers(&mut manifest);
        assert_eq!(containers.len(), 2, "each call prepends another daemon");
    }
}
