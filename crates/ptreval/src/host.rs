//! Best-effort description of the machine running the evaluation.

use ptreval_math::round_f64;
use ptreval_types::HostInfo;

/// `rustc --version` of the compiler that built this binary.
const RUSTC_VERSION: &str = match option_env!("PTREVAL_RUSTC_VERSION") {
    Some(version) => version,
    None => "rustc (unknown)",
};

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub(crate) fn host_info() -> HostInfo {
    let mut sys = sysinfo::System::new();
    sys.refresh_cpu_all();
    sys.refresh_memory();

    describe(
        sys.cpus().first().map(|cpu| cpu.brand()),
        sys.cpus().len(),
        sys.total_memory(),
        sysinfo::System::long_os_version(),
    )
}

fn describe(
    brand: Option<&str>,
    cpus: usize,
    total_memory_bytes: u64,
    long_os_version: Option<String>,
) -> HostInfo {
    let cores = if cpus > 0 {
        cpus
    } else {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    };
    HostInfo {
        cpu: brand
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or(std::env::consts::ARCH)
            .to_string(),
        cores,
        memory_gb: round_f64(total_memory_bytes as f64 / GIB, 2),
        os_version: long_os_version
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| std::env::consts::OS.to_string()),
        runtime_version: RUSTC_VERSION.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_a_known_machine() {
        let host = describe(
            Some("  Intel(R) Xeon(R) CPU @ 2.20GHz "),
            8,
            16_709_423_104,
            Some("Linux 24.04 Ubuntu".into()),
        );
        assert_eq!(host.cpu, "Intel(R) Xeon(R) CPU @ 2.20GHz");
        assert_eq!(host.cores, 8);
        assert_eq!(host.memory_gb, 15.56);
        assert_eq!(host.os_version, "Linux 24.04 Ubuntu");
    }

    #[test]
    fn missing_facts_fall_back_to_build_constants() {
        let host = describe(Some(""), 0, 0, None);
        assert_eq!(host.cpu, std::env::consts::ARCH);
        assert!(host.cores >= 1);
        assert_eq!(host.memory_gb, 0.0);
        assert_eq!(host.os_version, std::env::consts::OS);
    }

    #[test]
    fn live_host_reports_finite_memory_and_the_compiler() {
        let host = host_info();
        assert!(host.cores >= 1);
        assert!(host.memory_gb.is_finite());
        assert!(!host.os_version.is_empty());
        assert!(host.runtime_version.starts_with("rustc"));
    }
}
