use std::cell::RefCell;
use std::fs;
use std::io;
use std::path::Path;
use std::rc::Rc;

use serde_json;
use structopt::StructOpt;

use promfill::cliopt::CliOpt;
use promfill::error::ErrorKind;
use promfill::output::{LineWriter, Writer};
use promfill::runner::Runner;

#[test]
fn e2e() -> Result<(), Box<dyn std::error::Error>> {
    let root_test_dir = Path::new(file!()).parent().unwrap().join("scenarios");

    for test_dir in fs::read_dir(&root_test_dir)? {
        let test_dir = test_dir?.path();

        if let Ok(filter) = std::env::var("E2E_CASE") {
            if !test_dir.as_os_str().to_string_lossy().ends_with(&filter) {
                continue;
            }
        }

        let cli_args: Vec<String> =
            serde_json::from_str(&fs::read_to_string(test_dir.join("args.json"))?)?;
        let cli_args: Vec<String> = cli_args
            .iter()
            .map(|arg| arg.replace("$DIR", &test_dir.to_string_lossy()))
            .collect();

        let actual_output = run(&cli_args)?;
        let expected_output = fs::read(test_dir.join("output"))?;

        assert_eq!(
            expected_output,
            actual_output,
            "\nUnexpected output in '{}'.\nExpected:\n{}\nActual:\n{}",
            test_dir.display(),
            String::from_utf8_lossy(&expected_output),
            String::from_utf8_lossy(&actual_output),
        );
    }

    Ok(())
}

#[test]
fn e2e_missing_input_is_fatal() {
    let err = run(&[
        "promfill".to_owned(),
        "-s".to_owned(),
        "demo.1=/definitely/not/here.ndjson".to_owned(),
    ])
    .unwrap_err();

    let err = err
        .downcast_ref::<promfill::error::Error>()
        .expect("crate error");
    assert_eq!(err.kind(), ErrorKind::Input);
}

#[test]
fn e2e_malformed_line_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let dir = std::env::temp_dir().join(format!("promfill-e2e-{}", std::process::id()));
    fs::create_dir_all(&dir)?;
    let input = dir.join("broken.ndjson");
    fs::write(
        &input,
        "[{\"name\":\"up\",\"type\":\"gauge\",\"metrics\":[{\"value\":\"1\"}]}]\n[{\"name\":\n",
    )?;

    let ret = run(&[
        "promfill".to_owned(),
        "-s".to_owned(),
        format!("demo.1={}", input.display()),
        "--now".to_owned(),
        "2021-01-01T00:00:00Z".to_owned(),
    ]);
    fs::remove_dir_all(&dir)?;

    let err = ret.unwrap_err();
    let err = err
        .downcast_ref::<promfill::error::Error>()
        .expect("crate error");
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.message().starts_with("line 2:"), "{}", err);
    Ok(())
}

fn run(cli_args: &[String]) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let opt = CliOpt::from_iter(cli_args);

    let writer = Rc::new(RefCell::new(LineWriter::new(Vec::new())));

    struct TestWriter(Rc<RefCell<LineWriter<Vec<u8>>>>);

    impl Writer for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<()> {
            self.0.borrow_mut().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            self.0.borrow_mut().flush()
        }
    }

    let mut runner = Runner::new(
        &opt,
        vec![(
            "test".to_owned(),
            Box::new(TestWriter(Rc::clone(&writer))) as Box<dyn Writer>,
        )],
    );
    runner.run()?;

    // To make Rc::try_unwrap(writer) work.
    drop(runner);

    let writer = match Rc::try_unwrap(writer) {
        Ok(writer) => writer,
        _ => unreachable!(),
    };

    Ok(writer.into_inner().into_inner())
}
