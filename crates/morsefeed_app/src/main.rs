//! morsefeed - text and web pages for Morse code practice

mod cli;
mod logging;
mod man;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser};
use feed_logging::{feed_error, feed_info};
use morsefeed_engine::{
    run_feed, ErrorKind, FeedError, FeedSummary, FetchSettings, PageLoader, ReqwestFetcher,
};

use cli::Cli;

const LICENSE: &str = "\
Redistribution and use in source and binary forms, with or without modification, are permitted
provided that the following conditions are met:

Redistributions of source code must retain the above copyright notice, this list of conditions
and the following disclaimer.

Redistributions in binary form must reproduce the above copyright notice, this list of conditions
and the following disclaimer in the documentation and/or other materials provided with the
distribution.

THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS \"AS IS\" AND ANY EXPRESS OR
IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND
FITNESS FOR A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR
CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY
WAY OUT OF THE USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
";

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.license {
        println!("Copyright (C) {}. All rights reserved.\n", env!("CARGO_PKG_AUTHORS"));
        print!("{LICENSE}");
        return ExitCode::SUCCESS;
    }
    if cli.man_page {
        print!("{}", man::render(&mut Cli::command()));
        return ExitCode::SUCCESS;
    }

    logging::initialize(cli.log_destination(), cli.verbose);

    match run(&cli) {
        Ok(summary) => {
            feed_info!(
                "done: {} words, {} pages, stop {:?}",
                summary.words,
                summary.pages,
                summary.stop
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            feed_error!("{err}");
            eprintln!("error: {err}");
            ExitCode::from(exit_status(err.kind()))
        }
    }
}

fn run(cli: &Cli) -> Result<FeedSummary, FeedError> {
    let params = cli.feed_params()?;
    let loader = PageLoader::new(Arc::new(ReqwestFetcher::new(FetchSettings::default())))?;
    run_feed(&params, &loader)
}

fn exit_status(kind: ErrorKind) -> u8 {
    match kind {
        ErrorKind::InvalidValue => 2,
        ErrorKind::Io => 3,
        ErrorKind::Fetch => 4,
        ErrorKind::OutOfMemory => 5,
        ErrorKind::Pipe => 6,
        ErrorKind::ProcessSpawn => 7,
        ErrorKind::UnknownLabel => 8,
        ErrorKind::InternalInvariantViolation => 70,
    }
}
