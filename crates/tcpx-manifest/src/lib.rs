//! Transformation core for enabling GPUDirect-TCPX in a Kubernetes Job
//! manifest.
//!
//! Four passes mutate one shared [`JobManifest`] in a fixed order: the GKE
//! device/network annotations are merged in, the four host/ephemeral
//! volumes are appended, the RxDM sidecar is prepended to the container
//! list, and every GPU-requesting container is wired up to the daemon's
//! socket and the driver libraries. All intermediate mapping levels are
//! created on demand; nothing the manifest author wrote is dropped.

mod annotations;
mod container;
mod document;
mod gpu;
mod sidecar;
mod volumes;

pub use annotations::merge_annotations;
pub use document::{mapping_entry, sequence_entry, JobManifest, ManifestError};
pub use gpu::patch_gpu_containers;
pub use sidecar::inject_sidecar;
pub use volumes::inject_volumes;

/// Apply the full TCPX enablement to `manifest`.
///
/// `rxdm_version` selects the RxDM image tag and is used verbatim. The
/// passes are additive and deliberately not idempotent: rerunning on
/// already-patched output stacks a second sidecar and duplicate volumes.
pub fn enable_tcpx(manifest: &mut JobManifest, rxdm_version: &str) {
    tracing::debug!("merging TCPX annotations");
    merge_annotations(manifest);

    tracing::debug!("injecting TCPX volumes");
    inject_volumes(manifest);

    tracing::debug!(rxdm_version, "injecting tcpx-daemon sidecar");
    inject_sidecar(manifest, rxdm_version);

    tracing::debug!("patching GPU-requesting containers");
    patch_gpu_containers(manifest);
}
