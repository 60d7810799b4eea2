use std::env;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process;

use log::error;
use staffmidi::{
    preview_tones, Config, ExportRequest, ExportSettings, Exporter, MusicXmlRenderer, ScoreEditor,
    StaffError,
};

const USAGE: &str = "\
Usage: staffmidi [--config <file.yaml>] export <request.json|-> [--xml <score.xml>]
       staffmidi [--config <file.yaml>] place <offset>... [--out <file.mid>]
       staffmidi [--config <file.yaml>] preview <request.json|->";

fn usage() -> ! {
    eprintln!("{}", USAGE);
    process::exit(1);
}

fn main() {
    env_logger::init();

    let mut args: Vec<String> = env::args().skip(1).collect();

    // Parse flags
    let config = if args.first().map(String::as_str) == Some("--config") {
        if args.len() < 2 {
            usage();
        }
        let path = args.remove(1);
        args.remove(0);
        match Config::load(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    if args.is_empty() {
        usage();
    }
    let command = args.remove(0);

    let result = match command.as_str() {
        "export" => export(&config, &args),
        "place" => place(&config, &args),
        "preview" => preview(&config, &args),
        _ => usage(),
    };

    if let Err(e) = result {
        error!("{} failed: {}", command, e);
        match e {
            StaffError::Io(_) | StaffError::ExportFailed(_) if command != "preview" => {
                eprintln!("Export failed");
            }
            e => eprintln!("Error: {}", e),
        }
        process::exit(1);
    }
}

/// Read a request body from a file, or stdin for `-`.
fn read_body(path: &str) -> Result<Vec<u8>, StaffError> {
    if path == "-" {
        let mut body = Vec::new();
        io::stdin().read_to_end(&mut body)?;
        Ok(body)
    } else {
        Ok(fs::read(path)?)
    }
}

fn export(config: &Config, args: &[String]) -> Result<(), StaffError> {
    let (input, xml_path) = match args {
        [input] => (input, None),
        [input, flag, xml] if flag == "--xml" => (input, Some(xml)),
        _ => usage(),
    };

    let request = ExportRequest::from_json(&read_body(input)?);
    let response = Exporter::new(config.export.clone()).export(&request)?;

    if let Some(xml_path) = xml_path {
        let sequence = request.resolve(config.export.label_policy)?;
        fs::write(xml_path, staffmidi::to_musicxml(&sequence.labels()))?;
        eprintln!("Wrote MusicXML to {}", xml_path);
    }

    eprintln!(
        "Wrote {} ({} bytes, {})",
        response.path.display(),
        response.bytes.len(),
        response.content_disposition()
    );
    Ok(())
}

fn place(config: &Config, args: &[String]) -> Result<(), StaffError> {
    let Some((offsets, out)) = split_out_flag(args) else { usage() };

    let mut editor = ScoreEditor::new(config.staff.clone(), MusicXmlRenderer::new());
    for raw in offsets {
        let offset: f64 = raw
            .parse()
            .map_err(|_| StaffError::ConfigError(format!("'{}' is not a pixel offset", raw)))?;
        if editor.register_click(offset).is_none() {
            eprintln!("offset {} is off the staff, ignored", raw);
        }
    }

    println!("{}", editor.current_sequence().labels().join(" "));

    if let Some(out) = out {
        let response = exporter_for(out, &config.export).export_sequence(editor.current_sequence())?;
        eprintln!("Wrote {}", response.path.display());
    }
    Ok(())
}

/// Split `<offset>... [--out FILE]` into the offsets and the output path.
fn split_out_flag(args: &[String]) -> Option<(&[String], Option<&str>)> {
    let (offsets, out) = match args {
        [rest @ .., flag, path] if flag == "--out" => (rest, Some(path.as_str())),
        _ => (args, None),
    };
    if offsets.is_empty() || offsets.iter().any(|arg| arg == "--out") {
        return None;
    }
    Some((offsets, out))
}

/// Exporter writing to `path` instead of the configured export file.
fn exporter_for(path: &str, settings: &ExportSettings) -> Exporter {
    let path = Path::new(path);
    Exporter::new(ExportSettings {
        dir: path.parent().map(Path::to_path_buf).unwrap_or_default(),
        file_name: path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| settings.file_name.clone()),
        label_policy: settings.label_policy,
    })
}

fn preview(config: &Config, args: &[String]) -> Result<(), StaffError> {
    let [input] = args else { usage() };

    let request = ExportRequest::from_json(&read_body(input)?);
    let sequence = request.resolve(config.export.label_policy)?;

    let tones = preview_tones(&sequence, &config.preview);
    let json = serde_json::to_string_pretty(&tones)
        .map_err(|e| StaffError::ExportFailed(e.to_string()))?;
    println!("{}", json);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_out_flag() {
        let plain = args(&["175", "155"]);
        assert_eq!(split_out_flag(&plain), Some((&plain[..], None)));

        let with_out = args(&["175", "--out", "song.mid"]);
        assert_eq!(split_out_flag(&with_out), Some((&with_out[..1], Some("song.mid"))));

        assert_eq!(split_out_flag(&args(&["--out", "song.mid"])), None);
        assert_eq!(split_out_flag(&args(&["175", "--out"])), None);
        assert_eq!(split_out_flag(&[]), None);
    }

    #[test]
    fn test_out_file_replaces_configured_path() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("scores").join("song.mid");
        let exporter = exporter_for(target.to_str().unwrap(), &ExportSettings::default());

        assert_eq!(exporter.output_path(), target);
        let sequence = [staffmidi::Pitch::C4].into_iter().collect();
        let response = exporter.export_sequence(&sequence).unwrap();
        assert_eq!(fs::read(&target).unwrap(), response.bytes);
        assert_eq!(response.file_name, "song.mid");
    }
}
