use crate::commands::{connect, setup};
use lease_payout_database::queries;
use lease_payout_lib::config::PayoutArgs;

pub async fn exec(args: PayoutArgs) -> anyhow::Result<()> {
    let (start, end) = (args.start_block, args.end_block);
    let config = setup(args)?;

    let pool = connect(&config).await?;
    let mut conn = pool.acquire().await?;
    let blocks = queries::all_blocks(&mut conn, start, end).await?;

    println!("height generator fees reward txs timestamp");
    for block in blocks {
        println!(
            "{} {} {} {} {} {}",
            block.height,
            block.generator,
            block.fees,
            block.reward,
            block.tx_count,
            block.timestamp
        );
    }

    Ok(())
}
