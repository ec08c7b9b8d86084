//! kubeproto CLI - Kubernetes code generation from protobuf descriptors

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use kubeproto_codegen::Target;
use kubeproto_extract::ExtractOptions;

mod commands;
mod error;
mod exit_codes;

use commands::generate::GenerateArgs;
use error::{CliError, Result};

#[derive(Parser)]
#[command(name = "kubeproto")]
#[command(author = "kubeproto Contributors")]
#[command(version)]
#[command(about = "Kubernetes types, deep-copy, CRDs and clients from protobuf descriptors", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug output
    #[arg(long, global = true)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Rust structs, enum newtypes and Object impls
    Types(GenerateArgs),

    /// DeepCopy impls for every generated struct
    #[command(name = "deepcopy")]
    DeepCopy(GenerateArgs),

    /// CustomResourceDefinition manifests
    Crd(GenerateArgs),

    /// Typed client, shared informers and listers
    Client(GenerateArgs),

    /// The typed client over an in-memory object tracker
    Fake(GenerateArgs),

    /// Infer a .proto file from Rust API types
    Extract {
        /// Directory of Rust sources
        dir: PathBuf,

        /// Package of the emitted file, e.g. storage.v1
        #[arg(short, long)]
        package: String,

        /// Emit every public struct and enum, not only +kubeproto tagged ones
        #[arg(long)]
        all: bool,

        /// Extra import line(s)
        #[arg(long = "import", value_name = "FILE")]
        imports: Vec<String>,

        /// API group domain; adds the kubeproto.k8s file option
        #[arg(long)]
        domain: Option<String>,

        /// Output file (if not set, writes to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Types(args) => commands::generate::run(Target::Types, &args),
        Commands::DeepCopy(args) => commands::generate::run(Target::DeepCopy, &args),
        Commands::Crd(args) => commands::generate::run(Target::Crd, &args),
        Commands::Client(args) => commands::generate::run(Target::Client, &args),
        Commands::Fake(args) => commands::generate::run(Target::Fake, &args),

        Commands::Extract {
            dir,
            package,
            all,
            imports,
            domain,
            output,
        } => {
            if package.is_empty() {
                return Err(CliError::usage_with_help(
                    "--package must not be empty",
                    "pass the proto package of the emitted file, e.g. --package storage.v1",
                ));
            }
            let options = ExtractOptions {
                package,
                all,
                imports,
                domain,
            };
            commands::extract::run(&dir, options, output.as_deref())
        }
    }
}

fn main() {
    // Setup miette for nice error display
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.debug);

    if let Err(err) = run(cli.command) {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}
