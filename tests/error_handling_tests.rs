use std::fs;
use tailwind_css_modules::{convert, ConvertArgs, ConverterError};
use tempfile::TempDir;

fn args_for(temp_dir: &TempDir, input: &str) -> ConvertArgs {
    ConvertArgs {
        input: vec![temp_dir.path().join(input).display().to_string()],
        output: temp_dir.path().join("out"),
        config: None,
        verbose: false,
        diff: false,
        html_diff: false,
        json_report: false,
        dry_run: false,
    }
}

#[tokio::test]
async fn test_no_class_elements_writes_nothing() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("plain.tsx"),
        "export const Plain = () => <div><span>no classes here</span></div>;\n",
    )
    .unwrap();

    let result = convert(&args_for(&temp_dir, "plain.tsx")).await;

    match result {
        Err(ConverterError::NoClassElements { path }) => assert!(path.ends_with("plain.tsx")),
        other => panic!("expected NoClassElements, got {:?}", other.map(|r| r.len())),
    }
    assert!(!temp_dir.path().join("out").exists());
}

#[tokio::test]
async fn test_error_message_for_no_files_found() {
    let temp_dir = TempDir::new().unwrap();

    let result = convert(&args_for(&temp_dir, "missing.tsx")).await;
    assert!(matches!(result, Err(ConverterError::NoInputFiles)));

    let message = format!("{}", ConverterError::NoInputFiles);
    assert!(message.contains("No input files"));
}

#[tokio::test]
async fn test_output_path_is_a_file() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("row.tsx"), r#"<div class="flex"></div>"#).unwrap();
    fs::write(temp_dir.path().join("out"), "not a directory").unwrap();

    let result = convert(&args_for(&temp_dir, "row.tsx")).await;

    match result {
        Err(ConverterError::OutputError { path, .. }) => assert!(path.ends_with("out")),
        other => panic!("expected OutputError, got {:?}", other.map(|r| r.len())),
    }
}

#[tokio::test]
async fn test_invalid_config_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("row.tsx"), r#"<div class="flex"></div>"#).unwrap();
    let config_path = temp_dir.path().join("converter.yaml");
    fs::write(&config_path, "plain_element_prefix: \"9lives\"\n").unwrap();

    let mut args = args_for(&temp_dir, "row.tsx");
    args.config = Some(config_path);

    let result = convert(&args).await;
    assert!(matches!(result, Err(ConverterError::ConfigError { .. })));
    assert!(!temp_dir.path().join("out").exists());
}

#[tokio::test]
async fn test_malformed_config_reports_yaml_error() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("row.tsx"), r#"<div class="flex"></div>"#).unwrap();
    let config_path = temp_dir.path().join("converter.yml");
    fs::write(&config_path, "style_binding: [unclosed\n").unwrap();

    let mut args = args_for(&temp_dir, "row.tsx");
    args.config = Some(config_path);

    let error = convert(&args).await.unwrap_err();
    assert!(error.to_string().contains("YAML"), "unexpected error: {}", error);
}

#[tokio::test]
async fn test_unreadable_input_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    // Invalid UTF-8 cannot be read as markup
    fs::write(temp_dir.path().join("binary.tsx"), [0xff, 0xfe, 0x00, 0x80]).unwrap();

    let error = convert(&args_for(&temp_dir, "binary.tsx")).await.unwrap_err();
    match &error {
        ConverterError::InputError(message) => assert!(message.contains("binary.tsx")),
        other => panic!("expected InputError, got {}", other),
    }
    assert!(!temp_dir.path().join("out").exists());
}

#[tokio::test]
async fn test_inputs_with_same_stem_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    for dir in ["a", "b"] {
        fs::create_dir(temp_dir.path().join(dir)).unwrap();
        fs::write(temp_dir.path().join(dir).join("button.tsx"), r#"<button class="px-4"></button>"#).unwrap();
    }

    let mut args = args_for(&temp_dir, "a/button.tsx");
    args.input.push(temp_dir.path().join("b/button.tsx").display().to_string());

    match convert(&args).await {
        Err(ConverterError::InvalidInput(message)) => {
            assert!(message.contains(&temp_dir.path().join("a/button.tsx").display().to_string()), "{}", message);
            assert!(message.contains(&temp_dir.path().join("b/button.tsx").display().to_string()), "{}", message);
        }
        other => panic!("expected InvalidInput, got {:?}", other.map(|r| r.len())),
    }
    assert!(!temp_dir.path().join("out").exists());
}
