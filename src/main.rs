use std::io::Write;
use std::process::ExitCode;

use rustynet_client::HttpMethod;
use rustynet_client::client::{RequestError, RequestFactory};
use rustynet_client::config::{self, ClientConfig};

const USAGE: &str = "usage: rustynet-client [-c CONFIG] METHOD URL [BODY]";

fn main() -> ExitCode {
    env_logger::init();

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() >= 2 && args[0] == "-c" {
        let cfg = ClientConfig::from_file(&args[1]);
        if config::set_config(cfg).is_err() {
            log::warn!("Config already set, ignoring {}", args[1]);
        }
        args.drain(..2);
    }

    let (method, url, body) = match args.as_slice() {
        [method, url] => (method, url, None),
        [method, url, body] => (method, url, Some(body)),
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };
    let Some(method) = HttpMethod::resolve(&method.to_uppercase()) else {
        eprintln!("Unknown method {method}\n{USAGE}");
        return ExitCode::from(2);
    };

    match run(method, url, body.map(String::as_bytes)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Request failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(method: HttpMethod, url: &str, body: Option<&[u8]>) -> Result<(), RequestError> {
    let factory = RequestFactory::default();
    let mut request = factory.create_request(url, method)?;
    if let Some(body) = body {
        request.body()?.write_all(body)?;
    }

    let mut response = request.execute()?;
    let mut out = std::io::stdout().lock();
    writeln!(out, "{} {}", response.status_code()?, response.status_text()?)?;
    for (name, values) in response.headers()? {
        for value in values {
            writeln!(out, "{name}: {value}")?;
        }
    }
    writeln!(out)?;
    out.write_all(&response.body()?)?;
    out.flush()?;
    response.close();
    Ok(())
}
