use std::io::{Cursor, ErrorKind};

use quadra::pool::config::Workload;
use quadra::prompt::{read_workload, MenuStream};

fn run_prompt(input: &str) -> (std::io::Result<Workload>, String) {
    let mut input = Cursor::new(input.as_bytes().to_vec());
    let mut output = Vec::new();
    let result = read_workload(&mut input, &mut output);
    (result, String::from_utf8(output).unwrap())
}

#[test]
fn test_first_choice_accepted() {
    let (result, output) = run_prompt("1\n");
    assert_eq!(result.unwrap(), Workload::Small);
    assert!(output.contains("Choose an option:"));
    assert!(output.contains("Enter 1"));
    assert!(output.contains("30 randomly generated"));
    assert!(output.contains("3000 randomly generated"));
    assert!(!output.contains("Invalid choice"));
}

#[test]
fn test_invalid_choices_are_reprompted() {
    let (result, output) = run_prompt("7\nabc\n\n2\n");
    assert_eq!(result.unwrap(), Workload::Large);
    assert_eq!(output.matches("Invalid choice, please try again.").count(), 3);
    assert_eq!(output.matches("Choose an option:").count(), 4);
}

#[test]
fn test_end_of_input_is_an_error() {
    let (result, output) = run_prompt("9\n");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::UnexpectedEof);
    assert!(output.contains("Invalid choice"));
}

#[test]
fn test_choice_without_trailing_newline() {
    let (result, _) = run_prompt("2");
    assert_eq!(result.unwrap(), Workload::Large);
}

#[test]
fn test_menu_moves_to_stderr_for_json_reports() {
    assert_eq!(MenuStream::for_report(true), MenuStream::Stderr);
    assert_eq!(MenuStream::for_report(false), MenuStream::Stdout);
}
