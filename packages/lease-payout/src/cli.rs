pub(crate) use crate::commands::{check, dump, index, payout, transfer};
use clap::{Parser, Subcommand};
use lease_payout_lib::config::PayoutArgs;

#[derive(Parser, Debug)]
#[clap(
    name = "lease-payout",
    about = "Share a generator's fees and rewards with its leasers",
    version,
    rename_all = "kebab-case"
)]
pub struct Opt {
    #[clap(subcommand)]
    command: Payout,
}

#[derive(Debug, Subcommand)]
pub enum Payout {
    /// Mirror blocks and leases from the node into the ledger.
    Index(PayoutArgs),
    /// Compute the payout of a block window and write it to the payout file.
    Payout(PayoutArgs),
    /// Submit the payout file as mass transfers.
    Transfer(PayoutArgs),
    /// Summarize the payout file per asset.
    Check(PayoutArgs),
    /// Print the stored blocks.
    Dump(PayoutArgs),
}

pub async fn run_cli() -> anyhow::Result<()> {
    let opt = Opt::try_parse();

    match opt {
        Ok(opt) => match opt.command {
            Payout::Index(args) => index::exec(args).await,
            Payout::Payout(args) => payout::exec(args).await,
            Payout::Transfer(args) => transfer::exec(args).await,
            Payout::Check(args) => check::exec(args).await,
            Payout::Dump(args) => dump::exec(args).await,
        },
        Err(e) => {
            // Prints the error and exits.
            e.exit()
        }
    }
}
