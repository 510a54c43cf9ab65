use std::path::PathBuf;

use fake_gen::generate_interface_file;

use super::load_config;

/// Run `fake interface --file F --name I`.
pub fn run(
    file: PathBuf,
    name: String,
    output: Option<PathBuf>,
    package: Option<String>,
    no_gofmt: bool,
) -> i32 {
    let config = match load_config("interface") {
        Ok(config) => config,
        Err(code) => return code,
    };
    let output = output.unwrap_or(config.output);
    let package = package.unwrap_or(config.package_name);
    let gofmt = config.gofmt && !no_gofmt;

    match generate_interface_file(&file, &name, &output, &package, gofmt) {
        Ok(path) => {
            println!("{}", path.display());
            0
        }
        Err(e) => {
            eprintln!("fake interface: {e}");
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_interface_command_exit_codes() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("go.mod"), "module example.com/app\n\ngo 1.22\n").unwrap();
        fs::create_dir_all(root.join("api")).unwrap();
        let file = root.join("api/api.go");
        fs::write(&file, "package api\n\ntype Reader interface{ Read() string }\n").unwrap();
        let output = root.join("mocks");

        let code = run(
            file.clone(),
            "Reader".into(),
            Some(output.clone()),
            Some("mocks".into()),
            true,
        );
        assert_eq!(code, 0);
        assert!(output.join("api/api.Reader.gen.go").is_file());

        let code = run(file, "Writer".into(), Some(output), None, true);
        assert_eq!(code, 1);
    }
}
