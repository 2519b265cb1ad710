//! `stdport json`: validate and pretty-print JSON documents.

use crate::error::CliError;
use crate::utils::{load_configuration, open_input, open_output, GlobalOptions};
use clap::Args;
use std::io::{Read, Write};
use std::path::PathBuf;
use std::sync::Arc;
use stdport::json::{decode_bytes, Decoder, Encoder, EncoderOptions, Indent, Value};
use stdport::{Config, Error};

const DEFAULT_INDENT: usize = 4;

/// Validate JSON and write it back out formatted.
#[derive(Args)]
pub struct JsonCommand {
    /// Input file (default: standard input)
    #[arg(value_name = "INFILE")]
    pub infile: Option<PathBuf>,

    /// Output file (default: standard output)
    #[arg(value_name = "OUTFILE")]
    pub outfile: Option<PathBuf>,

    /// Sort object output by key
    #[arg(long)]
    pub sort_keys: bool,

    /// Write non-ASCII characters as-is instead of escaping them
    #[arg(long)]
    pub no_ensure_ascii: bool,

    /// Treat each input line as a separate document
    #[arg(long)]
    pub json_lines: bool,

    /// Spaces of indentation per level
    #[arg(long, value_name = "N", group = "whitespace")]
    pub indent: Option<usize>,

    /// Indent with a tab per level
    #[arg(long, group = "whitespace")]
    pub tab: bool,

    /// Print each document on a single line
    #[arg(long, group = "whitespace")]
    pub no_indent: bool,

    /// Compact output without any whitespace
    #[arg(long, group = "whitespace")]
    pub compact: bool,
}

impl JsonCommand {
    pub fn execute(self, global: &GlobalOptions) -> Result<(), CliError> {
        let config = load_configuration(global)?;
        let decoder = decoder_for(&config);
        let encoder = Encoder::with_options(self.encoder_options(&config));

        let mut raw = Vec::new();
        open_input(self.infile.as_deref())?.read_to_end(&mut raw)?;
        let text = decode_bytes(&raw)?;

        let documents = if self.json_lines {
            text.lines()
                .map(|line| decoder.decode(line))
                .collect::<stdport::Result<Vec<Value>>>()?
        } else {
            vec![decoder.decode(&text)?]
        };
        log::debug!("decoded {} document(s)", documents.len());

        let mut out = open_output(self.outfile.as_deref())?;
        for document in &documents {
            encoder.dump(document, &mut out)?;
            out.write_all(b"\n")?;
        }
        out.flush()?;
        Ok(())
    }

    /// Configuration supplies defaults; flags on the command line win.
    fn encoder_options(&self, config: &Config) -> EncoderOptions {
        let mut options = config.encoder_options();
        let configured_indent = config.json.as_ref().and_then(|j| j.indent.clone());

        if self.sort_keys {
            options.sort_keys = true;
        }
        if self.no_ensure_ascii {
            options.ensure_ascii = false;
        }

        if self.compact {
            options.indent = None;
            options.separators = Some((",".to_string(), ":".to_string()));
        } else if self.no_indent {
            options.indent = None;
        } else if self.tab {
            options.indent = Some(Indent::Text("\t".to_string()));
        } else if let Some(n) = self.indent {
            options.indent = Some(Indent::Spaces(n));
        } else {
            options.indent = Some(configured_indent.unwrap_or(Indent::Spaces(DEFAULT_INDENT)));
        }
        options
    }
}

/// A decoder honoring the configuration, including `allow_nan: false`.
fn decoder_for(config: &Config) -> Decoder {
    let decoder = Decoder::with_options(config.decoder_options());
    let allow_nan = config
        .json
        .as_ref()
        .and_then(|j| j.allow_nan)
        .unwrap_or(true);
    if allow_nan {
        return decoder;
    }
    decoder.with_parse_constant(Arc::new(|name: &str| -> stdport::Result<Value> {
        Err(Error::Value {
            message: format!("Out of range float values are not JSON compliant: {name}"),
        })
    }))
}
