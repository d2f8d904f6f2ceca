use std::path::{Path, PathBuf};

/// Where the patched manifest lands: the input file name with a `-tcpx`
/// suffix on the stem, extension preserved. An extensionless input gains
/// `-tcpx.yaml`.
pub fn tcpx_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "workload".to_string());

    let name = match input.extension() {
        Some(ext) => format!("{stem}-tcpx.{}", ext.to_string_lossy()),
        None => format!("{stem}-tcpx.yaml"),
    };
    input.with_file_name(name)
}

/// The operator checklist printed once the patched manifest is written.
pub fn next_steps(output: &Path, nccl_version: &str) -> String {
    format!(
        "\nPlease follow the below steps to complete enabling TCPX:\n\
         1. Deploy the NCCL plugin installer (version {nccl_version}) if it is not deployed yet:\n\
         \x20  kubectl apply -f https://raw.githubusercontent.com/GoogleCloudPlatform/container-engine-accelerators/master/gpudirect-tcpx/nccl-tcpx-installer.yaml\n\
         \x20  (replace 'nccl-tcpx-installer.yaml' with the manifest matching that version)\n\
         2. Deploy the NRI device injector plugin if it is not deployed yet:\n\
         \x20  kubectl apply -f https://raw.githubusercontent.com/GoogleCloudPlatform/container-engine-accelerators/master/nri_device_injector/nri-device-injector.yaml\n\
         3. Deploy your workload with the updated manifest: {output}\n\
         4. Verify your workload is working as expected\n",
        output = output.display(),
    )
}
