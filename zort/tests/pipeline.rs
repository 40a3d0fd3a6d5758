use std::{fs, process::Command};

use zort::*;

/// A throw-away directory holding one benchmarks list and one zummary.
struct Scratch {
    dir: PathBuf,
}

impl Scratch {
    fn new(tag: &str) -> Self {
        let dir = std::env::temp_dir().join(format!("zort-{}-{tag}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        Self { dir }
    }

    fn benchmarks(&self) -> PathBuf {
        self.dir.join("benchmarks")
    }

    fn write(&self, benchmarks: &str, zummary: &str) {
        fs::write(self.benchmarks(), benchmarks).unwrap();
        fs::write(self.dir.join("zummary"), zummary).unwrap();
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.dir);
    }
}

const HEADER: &str = "name status time real memory time-limit real-limit memory-limit\n";

/// Ten benchmarks; odd ones failed, every fourth one is heavy.
fn suite_files() -> (String, String) {
    let mut benchmarks = String::new();
    let mut zummary = String::from(HEADER);
    for i in 0..10 {
        benchmarks.push_str(&format!("{} cnf/b{i}.cnf b{i}\n", i + 1));
        let status = if i % 2 == 0 { 10 } else { 0 };
        let real = ((i * 7) % 10 + 1) as f64 * 10.0;
        let memory = if i % 4 == 0 { 9000.0 } else { 100.0 * (i + 1) as f64 };
        zummary.push_str(&format!(
            "b{i} {status} {real:.2} {real:.2} {memory:.1} 5000 5000 8000\n"
        ));
    }

    (benchmarks, zummary)
}

fn zort_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_zort"))
}

#[test]
fn files_to_report() {
    let scratch = Scratch::new("files");
    let (benchmarks, zummary) = suite_files();
    scratch.write(&benchmarks, &zummary);

    let benchmarks = BenchmarksReader::new(scratch.benchmarks()).read().unwrap();
    let zummaries = ZummaryReader::new(scratch.dir.join("zummary")).read().unwrap();
    assert_eq!(benchmarks.len(), 10);
    assert_eq!(zummaries.len(), 10);

    let cfg = Config { bucket_size: 4, nodes: 2, ..Config::default() };
    let report = zort::algo::zort(benchmarks, zummaries, &cfg).unwrap();

    let sizes: Vec<usize> = report.buckets.iter().map(|b| b.members.len()).collect();
    assert_eq!(sizes, vec![4, 4, 2]);
    assert_eq!(report.statistics.entries, 10);
    // b0, b4 and b8 are above the 8000 MB limit.
    assert_eq!(report.statistics.memory_limit_hits, 3);
    for b in &report.buckets {
        let real = b.members.iter().map(|m| m.real).fold(0.0, f64::max);
        assert_eq!(b.real, real);
        assert_eq!(b.end, b.start + b.real);
    }
    let latency = report.buckets.iter().map(|b| b.end).fold(0.0, f64::max);
    assert_eq!(report.statistics.latency, latency);
    let sum_real: f64 = report.buckets.iter().map(|b| b.real).sum();
    assert_eq!(report.statistics.cost.core_seconds, 4.0 * sum_real);
    // Only b6 and b2 qualify for the single fast bucket, shortest first.
    // Balancing then tops it up with heavier entries.
    let fast: Vec<&str> = report.buckets[0].members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(fast, vec!["b6", "b2", "b8", "b7"]);
    let last: Vec<&str> = report.buckets[2].members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(last, vec!["b4", "b9"]);
}

#[test]
fn generated_list_is_a_permutation() {
    let scratch = Scratch::new("generate");
    let (benchmarks, zummary) = suite_files();
    scratch.write(&benchmarks, &zummary);

    let out = zort_bin()
        .args(["-g", "-b", "3", "-n", "2"])
        .arg(scratch.benchmarks())
        .arg(&scratch.dir)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    let mut generated: Vec<&str> = stdout.lines().collect();
    assert_eq!(generated.len(), 10);
    generated.sort_unstable();
    let mut original: Vec<&str> = benchmarks.lines().collect();
    original.sort_unstable();
    assert_eq!(generated, original);
}

#[test]
fn keep_order_reproduces_the_input() {
    let scratch = Scratch::new("keep");
    let (benchmarks, zummary) = suite_files();
    scratch.write(&benchmarks, &zummary);

    let out = zort_bin()
        .args(["--keep-order", "--generate", "--bucket-size", "4"])
        .arg(scratch.benchmarks())
        .arg(&scratch.dir)
        .output()
        .unwrap();
    assert!(out.status.success());
    assert_eq!(String::from_utf8(out.stdout).unwrap(), benchmarks);
}

#[test]
fn statistics_are_printed_by_default() {
    let scratch = Scratch::new("stats");
    let (benchmarks, zummary) = suite_files();
    scratch.write(&benchmarks, &zummary);

    let out = zort_bin()
        .args(["--currency", "dollar", "--list"])
        .arg(scratch.benchmarks())
        .arg(&scratch.dir)
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8(out.stdout).unwrap();
    assert!(stdout.contains("Latency:"));
    assert!(stdout.contains("Cost:\t\t\t$"));
    assert!(stdout.contains("(memory limit)"));
}

#[test]
fn mismatch_fails_without_output() {
    let scratch = Scratch::new("mismatch");
    let (mut benchmarks, zummary) = suite_files();
    benchmarks.push_str("11 cnf/extra.cnf extra\n");
    scratch.write(&benchmarks, &zummary);

    let out = zort_bin()
        .arg(scratch.benchmarks())
        .arg(&scratch.dir)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("zort: error: could not find benchmark entry 'extra' in zummary"));
}

#[test]
fn missing_zummary_is_reported() {
    let scratch = Scratch::new("missing");
    fs::write(scratch.benchmarks(), "1 a\n").unwrap();

    let out = zort_bin()
        .arg(scratch.benchmarks())
        .arg(&scratch.dir)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8(out.stderr).unwrap();
    assert!(stderr.contains("zummary file"));
    assert!(stderr.contains("does not exist"));
}

#[test]
fn invalid_options_are_rejected() {
    let scratch = Scratch::new("options");
    let (benchmarks, zummary) = suite_files();
    scratch.write(&benchmarks, &zummary);

    let out = zort_bin()
        .args(["--nodes", "0"])
        .arg(scratch.benchmarks())
        .arg(&scratch.dir)
        .output()
        .unwrap();
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8(out.stderr).unwrap().contains("invalid number of nodes"));
}
