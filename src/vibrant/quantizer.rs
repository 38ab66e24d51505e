use super::{filter::Filter, swatch::Swatch};
use image::RgbaImage;
use std::{
    cmp::Ordering,
    collections::{BinaryHeap, HashMap},
};

const QUANTIZE_WORD_WIDTH: u32 = 5;
const QUANTIZE_SHIFT: u32 = 8 - QUANTIZE_WORD_WIDTH;
const MIN_ALPHA: u8 = 125;

/// Median cut quantizer over a reduced-precision color histogram.
pub(crate) struct Quantizer<'f> {
    max_colors: usize,
    filters: &'f [Box<dyn Filter>],
}

/// Every sampled pixel whose channels share the same high bits. The exact channel sums are kept so the final colors
/// are true averages instead of bucket corners.
#[derive(Debug, Clone, Copy)]
struct Bin {
    key: [u8; 3],
    count: u32,
    sums: [u64; 3],
}

struct ColorBox<'a> {
    bins: &'a mut [Bin],
    population: u32,
    min: [u8; 3],
    max: [u8; 3],
}

impl<'f> Quantizer<'f> {
    pub(crate) fn new(max_colors: usize, filters: &'f [Box<dyn Filter>]) -> Self {
        Self {
            max_colors: max_colors.max(1),
            filters,
        }
    }

    pub(crate) fn quantize(&self, image: &RgbaImage) -> Vec<Swatch> {
        let mut histogram: HashMap<[u8; 3], Bin> = HashMap::new();

        for pixel in image.pixels() {
            let [r, g, b, a] = pixel.0;
            if a < MIN_ALPHA {
                continue;
            }

            let key = [r >> QUANTIZE_SHIFT, g >> QUANTIZE_SHIFT, b >> QUANTIZE_SHIFT];
            let bin = histogram.entry(key).or_insert(Bin {
                key,
                count: 0,
                sums: [0; 3],
            });

            bin.count += 1;
            bin.sums[0] += r as u64;
            bin.sums[1] += g as u64;
            bin.sums[2] += b as u64;
        }

        let mut bins = histogram
            .into_values()
            .filter(|bin| self.is_allowed(bin.average()))
            .collect::<Vec<_>>();

        // the histogram iterates in arbitrary order; sorting keeps the output stable between runs
        bins.sort_unstable_by_key(|bin| bin.key);

        if bins.len() <= self.max_colors {
            return bins.iter().map(Bin::swatch).collect();
        }

        let mut queue = BinaryHeap::with_capacity(self.max_colors);
        queue.push(ColorBox::new(&mut bins));
        self.split_boxes(&mut queue);

        queue
            .into_sorted_vec()
            .iter()
            .rev()
            .map(ColorBox::average_color)
            .filter(|swatch| self.is_allowed(swatch.rgb()))
            .collect()
    }

    fn is_allowed(&self, rgb: (u8, u8, u8)) -> bool {
        if self.filters.is_empty() {
            return true;
        }

        let hsl = super::rgb_to_hsl(rgb);
        self.filters.iter().all(|filter| filter.is_allowed(rgb, hsl))
    }

    fn split_boxes(&self, queue: &mut BinaryHeap<ColorBox<'_>>) {
        while queue.len() < self.max_colors {
            let Some(largest) = queue.pop() else {
                return;
            };

            if !largest.can_split() {
                // the largest box holds a single bin, so every other box does as well
                queue.push(largest);
                return;
            }

            let (left, right) = largest.split();
            queue.push(left);
            queue.push(right);
        }
    }
}

impl Bin {
    fn average(&self) -> (u8, u8, u8) {
        let count = self.count.max(1) as u64;

        (
            (self.sums[0] / count) as u8,
            (self.sums[1] / count) as u8,
            (self.sums[2] / count) as u8,
        )
    }

    fn swatch(&self) -> Swatch {
        Swatch::new(self.average(), self.count)
    }
}

impl<'a> ColorBox<'a> {
    fn new(bins: &'a mut [Bin]) -> Self {
        let mut population = 0;
        let mut min = [u8::MAX; 3];
        let mut max = [0; 3];

        for bin in bins.iter() {
            population += bin.count;

            for channel in 0..3 {
                min[channel] = min[channel].min(bin.key[channel]);
                max[channel] = max[channel].max(bin.key[channel]);
            }
        }

        Self {
            bins,
            population,
            min,
            max,
        }
    }

    fn volume(&self) -> u32 {
        (0..3)
            .map(|channel| (self.max[channel] - self.min[channel]) as u32 + 1)
            .product()
    }

    fn can_split(&self) -> bool {
        self.bins.len() > 1
    }

    fn longest_channel(&self) -> usize {
        let lengths = [0, 1, 2].map(|channel| self.max[channel] - self.min[channel]);

        if lengths[0] >= lengths[1] && lengths[0] >= lengths[2] {
            0
        } else if lengths[1] >= lengths[2] {
            1
        } else {
            2
        }
    }

    /// Splits the box at the population median of its longest channel. Both halves always hold at least one bin.
    fn split(self) -> (ColorBox<'a>, ColorBox<'a>) {
        let channel = self.longest_channel();
        let midpoint = self.population / 2;
        let bins = self.bins;

        bins.sort_unstable_by_key(|bin| (bin.key[channel], bin.key));

        let mut running = 0;
        let mut split_at = bins.len() - 1;
        for (i, bin) in bins.iter().enumerate() {
            running += bin.count;

            if running >= midpoint {
                split_at = (i + 1).min(bins.len() - 1);
                break;
            }
        }

        let (left, right) = bins.split_at_mut(split_at.max(1));
        (ColorBox::new(left), ColorBox::new(right))
    }

    fn average_color(&self) -> Swatch {
        let (count, sums) = self.bins.iter().fold((0u64, [0u64; 3]), |(count, sums), bin| {
            (
                count + bin.count as u64,
                [sums[0] + bin.sums[0], sums[1] + bin.sums[1], sums[2] + bin.sums[2]],
            )
        });
        let count_divisor = count.max(1);

        Swatch::new(
            (
                (sums[0] / count_divisor) as u8,
                (sums[1] / count_divisor) as u8,
                (sums[2] / count_divisor) as u8,
            ),
            count as u32,
        )
    }
}

impl Eq for ColorBox<'_> {}
impl PartialEq for ColorBox<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

// the queue pops the largest box by volume first, falling back to population on ties
impl Ord for ColorBox<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.volume()
            .cmp(&other.volume())
            .then_with(|| self.population.cmp(&other.population))
    }
}

impl PartialOrd for ColorBox<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
