// Copyright 2024 RustFS Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use clap::{Parser, Subcommand};
use kube_console::types::kind::WorkloadKind;
use kube_console::{init_tracing, parse, render, run_console, template};
use shadow_rs::shadow;

shadow!(build);

#[derive(Parser)]
#[command(name = "kube-console")]
#[command(about = "Convert Kubernetes workload forms to YAML manifests and back", long_about = None)]
#[command(version = build::PKG_VERSION, long_version = build::CLAP_LONG_VERSION)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a workload descriptor (JSON or YAML) as a manifest
    Render {
        /// Workload kind, e.g. Deployment or CronJob (case-insensitive)
        #[arg(short, long)]
        kind: WorkloadKind,

        /// Descriptor file. If not set, the descriptor is read from stdin.
        #[arg(short, long)]
        file: Option<String>,

        /// Optional output path. If not set, the output will be written to stdout.
        #[arg(short, long)]
        output: Option<String>,
    },

    /// Read a manifest back into a descriptor, printed as JSON
    Parse {
        /// Manifest file. If not set, the manifest is read from stdin.
        #[arg(short, long)]
        file: Option<String>,
    },

    /// Output the starter manifest for a workload kind
    Template {
        #[arg(short, long)]
        kind: WorkloadKind,

        #[arg(short, long, default_value = "default")]
        namespace: String,
    },

    /// Run the console HTTP server
    Server {
        #[arg(short, long, default_value_t = 9090)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Render { kind, file, output } => render(kind, file, output).await?,
        Commands::Parse { file } => parse(file).await?,
        Commands::Template { kind, namespace } => template(kind, namespace).await?,
        Commands::Server { port } => run_console(port).await?,
    }

    Ok(())
}
