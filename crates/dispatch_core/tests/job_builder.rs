use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dispatch_core::{log_file_name, CommandTemplate, ConfigError, JobSpecBuilder};
use tempfile::TempDir;

fn template() -> CommandTemplate {
    CommandTemplate {
        program: "/opt/rIC3/rIC3".into(),
        args: vec!["-e".into(), "ic3".into(), "{input}".into()],
    }
}

fn touch(dir: &Path, relative: &str) -> PathBuf {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "aig 0 0 0 0 0\n").unwrap();
    path
}

#[test]
fn log_name_strips_only_the_last_extension() {
    assert_eq!(
        log_file_name(Path::new("/b/139442p0.aig")).as_deref(),
        Some("139442p0_log.txt")
    );
    assert_eq!(
        log_file_name(Path::new("cases/beem.adding.1.aig")).as_deref(),
        Some("beem.adding.1_log.txt")
    );
    assert_eq!(log_file_name(Path::new("/")), None);
}

#[test]
fn build_resolves_path_and_instantiates_command() {
    dispatch_logging::initialize_for_tests();
    let temp = TempDir::new().unwrap();
    let input = touch(temp.path(), "hwmcc20/6s0.aig");
    let builder = JobSpecBuilder::new(template(), "/tmp/logs", Duration::from_secs(3600));

    let job = builder.build(4, &input).unwrap();

    let absolute = fs::canonicalize(&input).unwrap();
    assert_eq!(job.id, 4);
    assert_eq!(job.input, input);
    assert_eq!(job.absolute_input, absolute);
    assert_eq!(job.log_path, PathBuf::from("/tmp/logs/6s0_log.txt"));
    assert_eq!(job.command.program, "/opt/rIC3/rIC3");
    assert_eq!(
        job.command.args,
        vec!["-e".to_string(), "ic3".to_string(), absolute.display().to_string()]
    );
    assert_eq!(job.deadline, Duration::from_secs(3600));
}

#[test]
fn unresolvable_input_is_a_configuration_error() {
    let temp = TempDir::new().unwrap();
    let builder = JobSpecBuilder::new(template(), temp.path(), Duration::from_secs(1));

    let err = builder
        .build(1, &temp.path().join("missing.aig"))
        .unwrap_err();
    assert!(matches!(err, ConfigError::UnresolvablePath { .. }));
}

#[test]
fn build_all_numbers_jobs_from_one_in_order() {
    let temp = TempDir::new().unwrap();
    let inputs = vec![
        touch(temp.path(), "a.aig"),
        touch(temp.path(), "b.aig"),
        touch(temp.path(), "c.aig"),
    ];
    let builder = JobSpecBuilder::new(template(), temp.path().join("logs"), Duration::from_secs(1));

    let jobs = builder.build_all(&inputs).unwrap();
    let ids: Vec<u64> = jobs.iter().map(|job| job.id).collect();
    let names: Vec<PathBuf> = jobs.iter().map(|job| job.input.clone()).collect();
    assert_eq!(ids, vec![1, 2, 3]);
    assert_eq!(names, inputs);
}

#[test]
fn build_all_rejects_colliding_log_names() {
    let temp = TempDir::new().unwrap();
    let inputs = vec![
        touch(temp.path(), "hwmcc20/x.aig"),
        touch(temp.path(), "hwmcc24/x.aig"),
    ];
    let builder = JobSpecBuilder::new(template(), temp.path().join("logs"), Duration::from_secs(1));

    match builder.build_all(&inputs).unwrap_err() {
        ConfigError::DuplicateLogName {
            log_name,
            first,
            second,
        } => {
            assert_eq!(log_name, "x_log.txt");
            assert_eq!(first, inputs[0]);
            assert_eq!(second, inputs[1]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[cfg(unix)]
#[test]
fn build_all_keeps_one_job_per_physical_file() {
    let temp = TempDir::new().unwrap();
    let walked = touch(temp.path(), "bench/x.aig");
    let other = touch(temp.path(), "bench/y.aig");
    std::os::unix::fs::symlink(temp.path().join("bench"), temp.path().join("link")).unwrap();
    let listed = temp.path().join("link/x.aig");
    let builder = JobSpecBuilder::new(template(), temp.path().join("logs"), Duration::from_secs(1));

    let jobs = builder
        .build_all(&[walked.clone(), listed, other.clone()])
        .unwrap();

    let ids: Vec<u64> = jobs.iter().map(|job| job.id).collect();
    let names: Vec<PathBuf> = jobs.iter().map(|job| job.input.clone()).collect();
    assert_eq!(ids, vec![1, 2]);
    assert_eq!(names, vec![walked, other]);
}
