use crate::document::{mapping_entry, JobManifest};

const DEVICE_LIST_KEY: &str = "devices.gke.io/container.tcpx-daemon";
const DEFAULT_INTERFACE_KEY: &str = "networking.gke.io/default-interface";
const INTERFACES_KEY: &str = "networking.gke.io/interfaces";

/// Devices the NRI injector hands to the tcpx-daemon container: the eight
/// A3 accelerators plus the two NVIDIA control devices.
const TCPX_DAEMON_DEVICES: &str = "\
- path: /dev/nvidia0
- path: /dev/nvidia1
- path: /dev/nvidia2
- path: /dev/nvidia3
- path: /dev/nvidia4
- path: /dev/nvidia5
- path: /dev/nvidia6
- path: /dev/nvidia7
- path: /dev/nvidiactl
- path: /dev/nvidia-uvm";

const DEFAULT_INTERFACE: &str = "eth0";

/// One interface on the default network plus one per data-path VPC.
const INTERFACE_LIST: &str = r#"[
    {"interfaceName":"eth0","network":"default"},
    {"interfaceName":"eth1","network":"vpc0"},
    {"interfaceName":"eth2","network":"vpc1"},
    {"interfaceName":"eth3","network":"vpc2"},
    {"interfaceName":"eth4","network":"vpc3"}
]"#;

/// Merge the GKE device and multi-network annotations into
/// `spec.template.metadata.annotations`.
///
/// The three TCPX keys overwrite colliding values; annotations this tool
/// does not own are left alone. The multi-line values are stored as plain
/// strings and rely on the serializer's literal block scalar output.
pub fn merge_annotations(manifest: &mut JobManifest) {
    let annotations = mapping_entry(manifest.pod_metadata(), "annotations");
    annotations.insert(DEVICE_LIST_KEY.into(), TCPX_DAEMON_DEVICES.into());
    annotations.insert(DEFAULT_INTERFACE_KEY.into(), DEFAULT_INTERFACE.into());
    annotations.insert(INTERFACES_KEY.into(), INTERFACE_LIST.into());
}
