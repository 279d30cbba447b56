//! Connected-component labelling of an alpha mask.

#[cfg(test)]
#[path = "islands_test.rs"]
mod islands_test;

use super::raster::AlphaMask;

/// A maximal 4-connected region of opaque pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Island {
    /// Label stored for this island's pixels in [`IslandMap`]; starts at 1.
    pub label: u32,
    pub pixel_count: usize,
    /// Topmost, then leftmost pixel.
    pub start: (u32, u32),
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Island labels for every pixel of a mask (0 = transparent).
#[derive(Debug, Clone)]
pub struct IslandMap {
    width: u32,
    height: u32,
    labels: Vec<u32>,
    islands: Vec<Island>,
}

impl IslandMap {
    /// Islands in discovery (row-major) order.
    #[must_use]
    pub fn islands(&self) -> &[Island] {
        &self.islands
    }

    /// Whether pixel `(x, y)` belongs to `island`. Out-of-range coordinates never do.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    #[must_use]
    pub fn contains(&self, island: &Island, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return false;
        }
        self.labels[self.index(x as u32, y as u32)] == island.label
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Label every 4-connected region of pixels whose alpha exceeds `threshold`.
///
/// Pixels are scanned row by row, so the seed of each island is its topmost,
/// then leftmost pixel.
#[must_use]
pub fn label_islands(mask: &AlphaMask, threshold: u8) -> IslandMap {
    let width = mask.width();
    let height = mask.height();
    let mut map = IslandMap {
        width,
        height,
        labels: vec![0; width as usize * height as usize],
        islands: Vec::new(),
    };
    let solid = |x: u32, y: u32| mask.alpha(x, y) > threshold;

    let mut stack: Vec<(u32, u32)> = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if map.labels[map.index(x, y)] != 0 || !solid(x, y) {
                continue;
            }
            let label = u32::try_from(map.islands.len() + 1).unwrap_or(u32::MAX);
            let mut island = Island {
                label,
                pixel_count: 0,
                start: (x, y),
                min_x: x,
                min_y: y,
                max_x: x,
                max_y: y,
            };
            let seed = map.index(x, y);
            map.labels[seed] = label;
            stack.push((x, y));

            while let Some((cx, cy)) = stack.pop() {
                island.pixel_count += 1;
                island.min_x = island.min_x.min(cx);
                island.max_x = island.max_x.max(cx);
                island.min_y = island.min_y.min(cy);
                island.max_y = island.max_y.max(cy);

                let neighbors = [
                    (cx.checked_add(1), Some(cy)),
                    (cx.checked_sub(1), Some(cy)),
                    (Some(cx), cy.checked_add(1)),
                    (Some(cx), cy.checked_sub(1)),
                ];
                for (nx, ny) in neighbors {
                    let (Some(nx), Some(ny)) = (nx, ny) else {
                        continue;
                    };
                    if nx >= width || ny >= height {
                        continue;
                    }
                    let idx = map.index(nx, ny);
                    if map.labels[idx] == 0 && solid(nx, ny) {
                        map.labels[idx] = label;
                        stack.push((nx, ny));
                    }
                }
            }
            map.islands.push(island);
        }
    }
    map
}
