use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use log::info;

use mushroom_form::{
    guide_markdown, server, AppConfig, InferenceService, Locale, ModelBundle, Selection, ServerConfig, Severity,
    DEFAULT_BIND,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the model manifest (JSON)
    #[arg(long, env = "MUSHROOM_FORM_MODEL", global = true)]
    model: Option<PathBuf>,

    /// Directory holding the guide images
    #[arg(long, env = "MUSHROOM_FORM_IMAGES", global = true)]
    images: Option<PathBuf>,

    /// Expected SHA-256 of the model manifest
    #[arg(long, env = "MUSHROOM_FORM_MODEL_SHA256", global = true)]
    model_sha256: Option<String>,

    /// Language of the form: ru or en
    #[arg(long, env = "MUSHROOM_FORM_LOCALE", global = true)]
    locale: Option<Locale>,

    /// Address the HTTP server listens on
    #[arg(long, env = "MUSHROOM_FORM_BIND", default_value = DEFAULT_BIND, global = true)]
    bind: SocketAddr,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the form over HTTP (default)
    Serve,
    /// Run one prediction from feature=code pairs
    Predict {
        /// A selection such as `odor=n`; leave spore-print-color out to use the fallback
        #[arg(long = "set", value_name = "FEATURE=CODE")]
        set: Vec<String>,
    },
    /// Print the generated selectors and the observation guide
    Form,
}

impl Args {
    fn app_config(&self) -> AppConfig {
        let mut config = AppConfig::default();
        if let Some(model) = &self.model {
            config.model_path = model.clone();
        }
        if let Some(images) = &self.images {
            config.images_dir = images.clone();
        }
        if let Some(locale) = self.locale {
            config.locale = locale;
        }
        config.model_sha256 = self.model_sha256.clone();
        config
    }

    fn server_config(&self) -> ServerConfig {
        ServerConfig { bind: self.bind }
    }
}

fn parse_pairs(pairs: &[String]) -> anyhow::Result<Selection> {
    let mut selection = Selection::new();
    for pair in pairs {
        let Some((feature, code)) = pair.split_once('=') else {
            bail!("expected FEATURE=CODE, got '{}'", pair);
        };
        selection.set(feature.trim(), code);
    }
    Ok(selection)
}

fn print_form(service: &InferenceService, locale: Locale) {
    let form = service.render_form(locale);
    println!("# {}\n", locale.text().form_heading);
    for field in &form.fields {
        println!("{} ({})", field.label, field.feature);
        for option in &field.options {
            println!("  - {}", option.text);
        }
    }
    println!();
    print!("{}", guide_markdown(locale));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    mushroom_form::init_logger();
    let args = Args::parse();
    let config = args.app_config();
    let server_config = args.server_config();

    let start_time = Instant::now();
    info!("Loading model bundle from {:?}", config.model_path);
    let bundle = ModelBundle::load(&config.model_path, &config.load_options())
        .with_context(|| format!("failed to load model bundle from {:?}", config.model_path))?;
    info!("Bundle loaded (took {:.2?})", start_time.elapsed());

    let service = InferenceService::new(Arc::new(bundle));

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let state = server::AppState::new(service, &config);
            server::serve(state, &server_config).await?;
        }
        Command::Predict { set } => {
            let selection = parse_pairs(&set)?;
            let outcome = service.submit(&selection, config.locale);
            if outcome.severity == Severity::Warning {
                eprintln!("{}\n\n{}", outcome.title, outcome.detail);
            } else {
                println!("{}\n\n{}", outcome.title, outcome.detail);
            }
        }
        Command::Form => print_form(&service, config.locale),
    }

    Ok(())
}
