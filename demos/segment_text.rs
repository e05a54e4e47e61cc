//! Segment a piece of text and print the patches it produces.
//!
//! Run with: `cargo run --example segment_text`

use patch_segmenter::prelude::*;

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let text = "aaaaaaaaaaaaaaaaaaaaaaaa Suddenly: x9$!q7@Zw# and then calm again...........";

    let config = PatcherConfig::default().with_patch_size(8);
    let patcher = BytePatcher::new(config)?;
    let seg = patcher.segment(&ByteBatch::single(text.as_bytes()));

    println!("input ({} bytes): {text:?}", text.len());
    println!(
        "{} patches, final threshold {:.2} bits\n",
        seg.num_patches(),
        seg.final_threshold()
    );

    let ids = seg.patch_ids().row(0);
    let entropy = seg.entropy().row(0);
    let bytes = text.as_bytes();

    let mut start = 0;
    for patch in 0..seg.row_patch_count(0) {
        let end = (start..bytes.len())
            .find(|&i| ids[i] as usize != patch)
            .unwrap_or(bytes.len());
        let slice = String::from_utf8_lossy(&bytes[start..end]);
        let mean_h: f64 = entropy.slice(ndarray::s![start..end]).mean().unwrap_or(0.0);
        println!("patch {patch:>3}  [{:>2} bytes, {mean_h:.2} bits]  {slice:?}", end - start);
        start = end;
    }

    let stats = seg.stats();
    println!(
        "\nmean patch length {:.2}, min {}, max {}",
        stats.mean_patch_len, stats.min_patch_len, stats.max_patch_len
    );
    Ok(())
}
