//! libzfs Boundary Smoke Test
//!
//!   Part A  Error taxonomy (translator tables and error context, offline)
//!   Part B  Handle (open /dev/zfs from the environment)
//!   Part C  Exchange (fetch pool configs with a growable inbound buffer)
//!   Part D  Paths (resolve each command-line argument to a dataset)
//!
//! Run: sudo ./target/release/zfs-smoke [PATH|DATASET]...
//! (Part A works anywhere; B-D need the zfs module loaded)

use nix::errno::Errno;

use zfs_core::{nicenum, CallClass, ExchangeError, ZfsCommand, ZfsErrorCode};
use zfs_errors::ErrorContext;
use zfs_module::zfs_sys::ZFS_IOC_POOL_CONFIGS;
use zfs_module::{resolve_path, DatasetRef, DevHandle};

// ── Test harness ──

struct TestRunner {
    total: usize,
    passed: usize,
    failed: usize,
}

const LINE: &str = "────────────────────────────────────────────────────────────";

impl TestRunner {
    fn new() -> Self {
        Self { total: 0, passed: 0, failed: 0 }
    }

    fn section(&self, name: &str) {
        println!("\n{}", LINE);
        println!("  {}", name);
        println!("{}", LINE);
    }

    fn pass(&mut self, name: &str) {
        self.total += 1;
        self.passed += 1;
        println!("  [{:2}] {:<52} PASS", self.total, name);
    }

    fn fail(&mut self, name: &str, reason: &str) {
        self.total += 1;
        self.failed += 1;
        println!("  [{:2}] {:<52} FAIL: {}", self.total, name, reason);
    }

    fn check(&mut self, name: &str, ok: bool, reason: &str) {
        if ok { self.pass(name); } else { self.fail(name, reason); }
    }

    fn summary(&self) {
        println!("\n{}", LINE);
        println!(
            "  Total: {}  Passed: {}  Failed: {}",
            self.total, self.passed, self.failed
        );
        println!("{}", LINE);
    }
}

// ════════════════════════════════════════════════════════════
// Part A: Error taxonomy
// ════════════════════════════════════════════════════════════

fn test_taxonomy(t: &mut TestRunner) {
    t.section("Part A: Error taxonomy (offline)");

    let mut ctx = ErrorContext::new();
    t.check("fresh context says 'no error'", ctx.describe() == "no error", ctx.describe());

    for class in [CallClass::Generic, CallClass::Dataset, CallClass::Pool] {
        let mut c = ErrorContext::new();
        c.report(class, Errno::EPERM, "probe");
        t.check(
            &format!("EPERM -> Perm ({:?})", class),
            c.code() == Some(ZfsErrorCode::Perm),
            &format!("{:?}", c.code()),
        );
    }

    let err = ctx.report(CallClass::Dataset, Errno::ENOENT, "cannot open 'tank/x'");
    t.check(
        "dataset ENOENT -> NoEnt + canned text",
        err.to_string() == "cannot open 'tank/x': dataset does not exist",
        &err.to_string(),
    );

    let err = ctx.report(CallClass::Pool, Errno::EBUSY, "cannot destroy 'tank'");
    t.check(
        "pool EBUSY -> Exists, 'pool is busy'",
        err.code() == ZfsErrorCode::Exists && ctx.describe() == "pool is busy",
        &err.to_string(),
    );

    ctx.report(CallClass::Pool, Errno::EMLINK, "cannot link");
    t.check(
        "unmapped errno -> Unknown + OS text",
        ctx.code() == Some(ZfsErrorCode::Unknown) && ctx.describe() == Errno::EMLINK.desc(),
        ctx.describe(),
    );

    ctx.set_auxiliary("'tank@' is not a snapshot");
    ctx.record_error(ZfsErrorCode::BadType, "cannot destroy");
    ctx.record_error(ZfsErrorCode::BadType, "cannot destroy");
    t.check(
        "staged text consumed by one record only",
        ctx.describe() == ZfsErrorCode::BadType.description() && !ctx.auxiliary_active(),
        ctx.describe(),
    );

    t.check("nicenum(9000) == 8.79K", nicenum(9000) == "8.79K", &nicenum(9000));
}

// ════════════════════════════════════════════════════════════
// Part B: Handle
// ════════════════════════════════════════════════════════════

fn test_open(t: &mut TestRunner) -> Option<DevHandle> {
    t.section("Part B: Handle (/dev/zfs)");

    match zfs_module::open_from_env() {
        Ok(h) => {
            t.pass("open handle");
            println!("       device:   {}", h.config().dev_path.display());
            println!("       mnttab:   {}", h.config().mnttab_path.display());
            println!("       sharetab: {}", if h.sharetab().is_some() { "present" } else { "absent" });
            Some(h)
        }
        Err(e) => {
            t.fail("open handle", &format!("{} (is the zfs module loaded?)", e));
            println!("       Skipping device tests.");
            None
        }
    }
}

// ════════════════════════════════════════════════════════════
// Part C: Exchange
// ════════════════════════════════════════════════════════════

fn test_exchange(t: &mut TestRunner, h: &mut DevHandle) {
    t.section("Part C: Pool config exchange");

    // Start small so a system with any pools exercises the regrow.
    let mut cmd = ZfsCommand::default();
    h.log_history("zfs-smoke: list pool configs");
    match h.call_with_growable_buffer(ZFS_IOC_POOL_CONFIGS, &mut cmd, 64) {
        Ok(()) => {
            t.pass("POOL_CONFIGS");
            println!("       packed configs: {} bytes ({})", cmd.dst_size(), nicenum(cmd.dst_size()));
            println!("       generation:     {}", cmd.cookie);
        }
        Err(ExchangeError::BufferTooSmall { required }) => {
            t.fail("POOL_CONFIGS", &format!("still too small after regrow ({} bytes)", required));
        }
        Err(e) => {
            let z = h.report_exchange(CallClass::Pool, e, "cannot list pool configurations");
            t.fail("POOL_CONFIGS", &z.to_string());
        }
    }
    t.check("journal consumed", h.pending_history().is_none(), "history still pending");

    cmd.release();
    cmd.release();
    t.check("double release", cmd.inbound().is_none() && cmd.outbound().is_none(), "buffers left");
}

// ════════════════════════════════════════════════════════════
// Part D: Paths
// ════════════════════════════════════════════════════════════

fn test_paths(t: &mut TestRunner, h: &DevHandle, args: &[String]) {
    t.section("Part D: Path resolution");

    if args.is_empty() {
        println!("       (no arguments given)");
        return;
    }
    for arg in args {
        match resolve_path(h, arg) {
            Ok(DatasetRef::Name(n)) => t.pass(&format!("{} (name: {})", arg, n)),
            Ok(DatasetRef::Mounted { dataset, mountpoint }) => {
                t.pass(&format!("{} -> {} @ {}", arg, dataset, mountpoint.display()))
            }
            Err(e) => t.fail(arg, &e.to_string()),
        }
    }
}

fn main() {
    println!("=== libzfs Boundary Smoke Test ===");
    let args: Vec<String> = std::env::args().skip(1).collect();

    let mut t = TestRunner::new();

    test_taxonomy(&mut t);

    if let Some(mut h) = test_open(&mut t) {
        test_exchange(&mut t, &mut h);
        test_paths(&mut t, &h, &args);
        h.close();
    }

    t.summary();
    std::process::exit(if t.failed > 0 { 1 } else { 0 });
}
