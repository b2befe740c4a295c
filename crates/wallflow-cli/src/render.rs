//! Plain-text rendering of a masonry grid.

use std::io::{self, Write};
use wallflow_gallery::PositionedImage;

/// One block per column; each card shows its offset, height, badges, title
/// and URL.
pub fn render_grid(out: &mut impl Write, grid: &[Vec<PositionedImage>]) -> io::Result<()> {
    for (index, column) in grid.iter().enumerate() {
        writeln!(out, "== column {} ({} images) ==", index + 1, column.len())?;
        for card in column {
            writeln!(
                out,
                "  {:>5}px +{:<3} {}{}",
                card.top,
                card.height,
                badges(card),
                card.image.title
            )?;
            writeln!(out, "               {}", card.image.url)?;
        }
    }
    Ok(())
}

fn badges(card: &PositionedImage) -> String {
    let mut badges = String::new();
    if card.image.is_premium {
        badges.push_str("[premium] ");
    }
    if card.image.is_coins {
        badges.push_str("[coins] ");
    }
    badges
}

#[cfg(test)]
mod tests {
    use super::*;
    use wallflow_core::Image;

    fn card(id: &str, column: usize, top: u32, premium: bool, coins: bool) -> PositionedImage {
        PositionedImage {
            image: Image {
                id: id.to_string(),
                url: format!("https://cdn/{id}.jpg"),
                title: format!("t{id}"),
                is_premium: premium,
                is_coins: coins,
            },
            column,
            top,
            height: 250,
        }
    }

    #[test]
    fn test_render_grid() {
        let grid = vec![
            vec![card("1", 0, 0, true, false), card("3", 0, 266, false, false)],
            vec![card("2", 1, 0, true, true)],
        ];
        let mut out = Vec::new();
        render_grid(&mut out, &grid).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("== column 1 (2 images) =="));
        assert!(text.contains("== column 2 (1 images) =="));
        assert!(text.contains("[premium] t1"));
        assert!(text.contains("[premium] [coins] t2"));
        assert!(text.contains("  266px +250 t3"));
        assert!(text.contains("https://cdn/2.jpg"));
    }

    #[test]
    fn test_render_empty_grid() {
        let mut out = Vec::new();
        render_grid(&mut out, &[Vec::new()]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "== column 1 (0 images) ==\n");
    }
}
