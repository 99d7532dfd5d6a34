//! Command-line surface and dispatch.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing::debug;

use crate::batch;
use crate::config::GeneratorConfig;
use crate::content::{Content, WifiSecurity};
use crate::samples;
use crate::scan;
use crate::style::Capabilities;

#[derive(Parser, Debug)]
#[command(
    name = "qrsmith",
    version,
    about = "Generate, batch, and scan styled QR codes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a single QR code
    Generate(GenerateArgs),

    /// Generate QR codes from a CSV or JSON manifest
    Batch {
        /// Manifest file (.csv or .json)
        input: PathBuf,

        /// Directory for generated files
        #[arg(short, long, default_value = "exports/batch_output")]
        output: PathBuf,

        /// Base config file applied to every row
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decode QR codes from an image
    Scan {
        /// Image file to scan
        #[arg(short, long)]
        file: PathBuf,

        /// Classify decoded content (url, wifi, vcard, ...)
        #[arg(long)]
        analyze: bool,

        /// Write results as JSON to this path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write sample manifests and a config template
    Samples {
        /// Write enhanced_batch.csv
        #[arg(long)]
        csv: bool,

        /// Write enhanced_batch.json
        #[arg(long)]
        json: bool,

        /// Write config_template.json
        #[arg(long)]
        config: bool,

        /// Write all sample files
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Literal content to encode; exclusive with the typed content flags
    pub content: Option<String>,

    /// URL content; https:// is prepended when no scheme is given
    #[arg(long, conflicts_with = "content")]
    pub url: Option<String>,

    /// WiFi network name
    #[arg(long, conflicts_with = "content")]
    pub wifi_ssid: Option<String>,

    #[arg(long, requires = "wifi_ssid")]
    pub wifi_password: Option<String>,

    /// WPA, WEP, or nopass
    #[arg(long, default_value = "WPA", requires = "wifi_ssid")]
    pub wifi_security: String,

    #[arg(long, requires = "wifi_ssid")]
    pub wifi_hidden: bool,

    /// Contact name for a vCard
    #[arg(long, conflicts_with = "content")]
    pub vcard_name: Option<String>,

    #[arg(long, requires = "vcard_name")]
    pub vcard_org: Option<String>,

    #[arg(long, requires = "vcard_name")]
    pub vcard_phone: Option<String>,

    #[arg(long, requires = "vcard_name")]
    pub vcard_email: Option<String>,

    #[arg(long, requires = "vcard_name")]
    pub vcard_url: Option<String>,

    /// Email recipient; builds a mailto: payload
    #[arg(long, conflicts_with = "content")]
    pub email_to: Option<String>,

    #[arg(long, requires = "email_to")]
    pub email_subject: Option<String>,

    #[arg(long, requires = "email_to")]
    pub email_body: Option<String>,

    /// Phone number; builds a tel: payload
    #[arg(long, conflicts_with = "content")]
    pub phone: Option<String>,

    /// SMS number; builds an sms: payload
    #[arg(long, conflicts_with = "content")]
    pub sms_to: Option<String>,

    #[arg(long, requires = "sms_to")]
    pub sms_body: Option<String>,

    /// Output path; the extension picks the format unless --format is set
    #[arg(short, long, default_value = "qr_code.png")]
    pub out: PathBuf,

    /// Config file providing style defaults
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Export format (PNG, JPEG, BMP, TIFF, WEBP, ICO, SVG)
    #[arg(long)]
    pub format: Option<String>,

    #[arg(long)]
    pub theme: Option<String>,

    #[arg(long)]
    pub color_mask: Option<String>,

    /// Output side length in pixels
    #[arg(long)]
    pub size: Option<u32>,

    /// Quiet-zone width in modules
    #[arg(long)]
    pub border: Option<u32>,

    /// Error correction level: L, M, Q, or H
    #[arg(long)]
    pub error_correction: Option<String>,

    #[arg(long)]
    pub fg_color: Option<String>,

    #[arg(long)]
    pub bg_color: Option<String>,

    /// Overlay image to composite at the center
    #[arg(long)]
    pub image: Option<PathBuf>,

    /// Overlay size as a percentage of the QR side
    #[arg(long)]
    pub image_size: Option<u32>,

    /// Overlay matte: match, custom, or none
    #[arg(long)]
    pub image_bg: Option<String>,

    #[arg(long)]
    pub image_bg_color: Option<String>,

    #[arg(long)]
    pub image_padding: Option<u32>,

    /// Image whose colors fill the modules (sets the image color mask)
    #[arg(long)]
    pub mask_image: Option<PathBuf>,
}

impl GenerateArgs {
    /// Build the payload from whichever content source was given.
    fn resolve_content(&self) -> anyhow::Result<String> {
        let content = if let Some(ssid) = &self.wifi_ssid {
            Content::Wifi {
                ssid: ssid.clone(),
                password: self.wifi_password.clone().unwrap_or_default(),
                security: WifiSecurity::parse(&self.wifi_security),
                hidden: self.wifi_hidden,
            }
        } else if let Some(name) = &self.vcard_name {
            Content::VCard {
                name: name.clone(),
                org: self.vcard_org.clone().unwrap_or_default(),
                phone: self.vcard_phone.clone().unwrap_or_default(),
                email: self.vcard_email.clone().unwrap_or_default(),
                url: self.vcard_url.clone().unwrap_or_default(),
            }
        } else if let Some(to) = &self.email_to {
            Content::Email {
                to: to.clone(),
                subject: self.email_subject.clone().unwrap_or_default(),
                body: self.email_body.clone().unwrap_or_default(),
            }
        } else if let Some(number) = &self.phone {
            Content::Phone {
                number: number.clone(),
            }
        } else if let Some(number) = &self.sms_to {
            Content::Sms {
                number: number.clone(),
                body: self.sms_body.clone().unwrap_or_default(),
            }
        } else if let Some(url) = &self.url {
            Content::Url { url: url.clone() }
        } else if let Some(text) = &self.content {
            Content::Text { text: text.clone() }
        } else {
            anyhow::bail!("no content given: pass a positional argument or a typed content flag");
        };
        let payload = content.payload();
        anyhow::ensure!(!payload.trim().is_empty(), "content resolves to an empty payload");
        Ok(payload)
    }

    /// Overlay the CLI flags onto the loaded or default config.
    fn apply_to(&self, cfg: &mut GeneratorConfig) {
        macro_rules! set {
            ($field:ident) => {
                if let Some(v) = &self.$field {
                    cfg.$field = v.clone();
                }
            };
        }
        set!(theme);
        set!(color_mask);
        set!(error_correction);
        set!(fg_color);
        set!(bg_color);
        set!(format);
        set!(image_bg);
        set!(image_bg_color);
        if let Some(v) = self.size {
            cfg.size = v;
        }
        if let Some(v) = self.border {
            cfg.border = v;
        }
        if let Some(v) = self.image_size {
            cfg.image_size = v;
        }
        if let Some(v) = self.image_padding {
            cfg.image_padding = v;
        }
        if let Some(path) = &self.image {
            cfg.use_image = true;
            cfg.image_path = path.display().to_string();
        }
        if let Some(path) = &self.mask_image {
            cfg.color_mask = "image".into();
            cfg.mask_image_path = path.display().to_string();
        }
    }
}

pub fn run(cli: Cli) -> anyhow::Result<()> {
    let caps = Capabilities::detect();
    debug!(webp = caps.webp_encode, "encoder capabilities");

    match cli.command {
        Commands::Generate(args) => run_generate(args, &caps),
        Commands::Batch {
            input,
            output,
            config,
        } => {
            let base = load_config(config.as_deref())?;
            let summary = batch::run(&input, &output, &base, &caps)
                .with_context(|| format!("batch from {}", input.display()))?;
            println!(
                "Batch complete: {summary} ({:.0}% success)",
                summary.success_rate()
            );
            Ok(())
        }
        Commands::Scan {
            file,
            analyze,
            output,
        } => run_scan(&file, analyze, output.as_deref()),
        Commands::Samples {
            csv,
            json,
            config,
            all,
        } => {
            let everything = all || !(csv || json || config);
            let here = std::env::current_dir()?;
            if everything || csv {
                let path = samples::write_sample_csv(&here)?;
                println!("Created {}", path.display());
            }
            if everything || json {
                let path = samples::write_sample_json(&here)?;
                println!("Created {}", path.display());
            }
            if everything || config {
                let path = samples::write_config_template(&here)?;
                println!("Created {}", path.display());
            }
            Ok(())
        }
    }
}

fn run_generate(args: GenerateArgs, caps: &Capabilities) -> anyhow::Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    args.apply_to(&mut cfg);
    // The output extension picks the format when --format is absent.
    if args.format.is_none() {
        cfg.format = crate::export::ExportFormat::from_path(&args.out)
            .extension()
            .to_uppercase();
    }

    let payload = args.resolve_content()?;
    let dir = args
        .out
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(std::path::Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    std::fs::create_dir_all(&dir)?;
    let stem = args
        .out
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("qr_code")
        .to_string();

    let path = batch::generate_one(&payload, &stem, &cfg, &dir, caps)?;
    println!("Generated {}", path.display());
    Ok(())
}

fn run_scan(
    file: &std::path::Path,
    analyze: bool,
    output: Option<&std::path::Path>,
) -> anyhow::Result<()> {
    let hits = scan::scan_file(file, analyze)
        .with_context(|| format!("scan of {}", file.display()))?;
    if hits.is_empty() {
        println!("No QR codes found");
        return Ok(());
    }
    for (i, hit) in hits.iter().enumerate() {
        println!("QR {}: {}", i + 1, hit.content);
        if let Some(analysis) = &hit.analysis {
            println!("  type: {}", analysis.kind);
            if let Some(details) = analysis.details.as_object() {
                for (key, value) in details {
                    println!("  {key}: {value}");
                }
            }
        }
    }
    if let Some(path) = output {
        scan::write_report(&hits, path)?;
        println!("Report saved to {}", path.display());
    }
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<GeneratorConfig> {
    match path {
        Some(path) => GeneratorConfig::load(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(GeneratorConfig::default()),
    }
}
