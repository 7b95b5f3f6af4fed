use ampgen::config::Site;
use ampgen::naming::{AMP_EXT, HTML_EXT};
use ampgen::output::{self, Outcome, PageReport};
use ampgen::render;
use ampgen::types::Mode;
use clap::{Parser, Subcommand};
use log::{info, warn};
use rayon::prelude::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "ampgen")]
#[command(about = "Render extended-markdown pages into canonical and AMP HTML")]
#[command(long_about = "\
Render extended-markdown pages into canonical and AMP HTML

Every page is rendered twice: name.html with a hash-pinned
Content-Security-Policy, and name.amp.html for AMP caches.

Site structure:

  site/
  ├── site.toml        # base URL, titles, logos, navigation tree
  ├── pages/
  │   ├── index.md     # every page starts with a ```page block
  │   └── about.md
  ├── static/          # images and downloads, served from the site root
  ├── static_gen/      # generated variants (WebP etc.)
  └── inline/          # base.css, desktop.css, mobile.css, base.js, map.js ...

Set RUST_LOG=debug for per-page rendering details.")]
#[command(version)]
struct Cli {
    /// Site root containing site.toml
    #[arg(long, default_value = ".", global = true)]
    site: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one page and print the HTML
    Render {
        /// Markdown page
        page: PathBuf,
        /// Produce the AMP variant
        #[arg(long)]
        amp: bool,
    },
    /// Render every page in both variants
    Build {
        /// Output directory
        #[arg(long, default_value = "out")]
        out: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let site = Site::load(&cli.site)?;

    match cli.command {
        Command::Render { page, amp } => {
            let mode = if amp { Mode::Amp } else { Mode::NonAmp };
            let markdown = std::fs::read(&page)?;
            let rendered = render::render(&site, &markdown, mode)?;
            print!("{}", rendered.html);
        }
        Command::Build { out } => {
            std::fs::create_dir_all(&out)?;
            let files = site.page_files()?;
            info!(
                "rendering {} pages from {}",
                files.len(),
                site.page_dir().display()
            );
            let reports: Vec<PageReport> = files
                .par_iter()
                .map(|path| build_page(&site, path, &out))
                .collect();
            output::print_build_output(&reports);

            let failed = output::failure_count(&reports);
            if failed > 0 {
                return Err(format!("{failed} renders failed").into());
            }
            info!("build complete: {}", out.display());
        }
    }

    Ok(())
}

/// Render one page file in both variants into `out`.
fn build_page(site: &Site, path: &Path, out: &Path) -> PageReport {
    let name = |p: Option<&std::ffi::OsStr>| {
        p.map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    };
    let source = name(path.file_name());
    let stem = name(path.file_stem());
    let mut report = PageReport {
        source,
        title: None,
        variants: Vec::new(),
    };

    let markdown = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("{}: {e}", path.display());
            for mode in [Mode::NonAmp, Mode::Amp] {
                report.variants.push((
                    mode,
                    Outcome::Failed {
                        kind: None,
                        message: e.to_string(),
                    },
                ));
            }
            return report;
        }
    };

    for mode in [Mode::NonAmp, Mode::Amp] {
        let file = match mode {
            Mode::NonAmp => format!("{stem}{HTML_EXT}"),
            Mode::Amp => format!("{stem}{AMP_EXT}"),
        };
        let outcome = match render::render(site, &markdown, mode) {
            Ok(page) => {
                report.title.get_or_insert(page.meta.title);
                match std::fs::write(out.join(&file), page.html) {
                    Ok(()) => Outcome::Written(file),
                    Err(e) => Outcome::Failed {
                        kind: None,
                        message: e.to_string(),
                    },
                }
            }
            Err(e) => {
                warn!("{} ({}): {e}", path.display(), mode.name());
                Outcome::Failed {
                    kind: Some(e.kind()),
                    message: e.to_string(),
                }
            }
        };
        report.variants.push((mode, outcome));
    }
    report
}
