//! Word-frequency clouds over the `context` text of a split.
//!
//! Layout is deterministic: words are sized by relative frequency and placed
//! along an elliptical spiral from the centre of a fixed canvas onto a coarse
//! occupancy grid. The same text always yields the same cloud.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use once_cell::sync::Lazy;
use regex::Regex;

/// English words dropped before counting.
static STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and",
        "any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
        "both", "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during",
        "each", "else", "ever", "few", "for", "from", "further", "had", "has", "have", "having",
        "he", "her", "here", "hers", "herself", "him", "himself", "his", "how", "however", "i",
        "if", "in", "into", "is", "it", "its", "itself", "just", "me", "more", "most", "my",
        "myself", "no", "nor", "not", "of", "off", "on", "once", "only", "or", "other", "otherwise",
        "ought", "our", "ours", "ourselves", "out", "over", "own", "same", "shall", "she", "should",
        "so", "some", "such", "than", "that", "the", "their", "theirs", "them", "themselves",
        "then", "there", "these", "they", "this", "those", "through", "to", "too", "under",
        "until", "up", "very", "was", "we", "were", "what", "when", "where", "which", "while",
        "who", "whom", "why", "with", "would", "you", "your", "yours", "yourself", "yourselves",
        "don't", "isn't", "wasn't", "aren't", "weren't", "can't", "won't", "it's", "that's",
        "there's", "he's", "she's", "i'm", "you're", "we're", "they're", "i've", "you've",
        "we've", "they've", "i'd", "you'd", "he'd", "she'd", "we'd", "they'd", "i'll", "you'll",
        "he'll", "she'll", "we'll", "they'll", "let's", "http", "https", "www", "com", "r",
    ]
    .into_iter()
    .collect()
});

static WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w[\w']+").unwrap());

/// Viridis stops, dark to bright. Frequent words get the bright end.
const PALETTE: &[(u8, u8, u8)] = &[
    (68, 1, 84),
    (72, 40, 120),
    (62, 74, 137),
    (49, 104, 142),
    (38, 130, 142),
    (31, 158, 137),
    (53, 183, 121),
    (109, 205, 89),
    (180, 222, 44),
    (253, 231, 37),
];

/// Glyph width as a fraction of the font size, for box estimates.
const CHAR_ASPECT: f32 = 0.6;

/// Pixels removed from a word's size per failed placement.
const FONT_STEP: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub struct WordCloudOptions {
    pub width: u32,
    pub height: u32,
    pub max_words: usize,
    pub max_font_size: f32,
    pub min_font_size: f32,
    /// How much each word's size follows its count relative to the previous
    /// word: 0 keeps the size until space runs out, 1 is proportional.
    pub relative_scaling: f32,
    /// Occupancy grid resolution in pixels.
    pub cell_size: u32,
}

impl Default for WordCloudOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 400,
            max_words: 200,
            max_font_size: 120.0,
            min_font_size: 4.0,
            relative_scaling: 0.5,
            cell_size: 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub count: usize,
    /// Frequency relative to the most frequent word, in `(0, 1]`.
    pub weight: f32,
    pub font_size: f32,
    /// Top-left corner and size of the word's box, in pixels.
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PlacedWord {
    pub fn color(&self) -> (u8, u8, u8) {
        let last = PALETTE.len() - 1;
        let idx = (self.weight.clamp(0.0, 1.0) * last as f32).round() as usize;
        PALETTE[idx.min(last)]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WordCloud {
    pub width: u32,
    pub height: u32,
    pub words: Vec<PlacedWord>,
}

impl WordCloud {
    /// Count words in `text` and lay out the most frequent ones.
    pub fn generate(text: &str, opts: &WordCloudOptions) -> Self {
        let freqs = word_frequencies(text);
        Self::from_frequencies(&freqs, opts)
    }

    /// Lay out words given `(word, count)` pairs sorted by descending count.
    pub fn from_frequencies(freqs: &[(String, usize)], opts: &WordCloudOptions) -> Self {
        let mut cloud = Self {
            width: opts.width,
            height: opts.height,
            words: Vec::new(),
        };
        let Some(max_count) = freqs.first().map(|(_, c)| *c).filter(|c| *c > 0) else {
            return cloud;
        };

        let cell = opts.cell_size.max(1);
        let mut grid = OccupancyGrid::new(opts.width / cell, opts.height / cell);
        let spiral = grid.spiral();
        let rs = opts.relative_scaling.clamp(0.0, 1.0);

        // Each size is derived from the previous word's, so the tail keeps
        // shrinking as the canvas fills.
        let mut font = opts.max_font_size;
        let mut last_count = max_count;
        for (word, count) in freqs.iter().take(opts.max_words) {
            if *count == 0 {
                continue;
            }
            let weight = *count as f32 / max_count as f32;
            font *= rs * (*count as f32 / last_count as f32) + (1.0 - rs);
            let mut placed = None;

            while font >= opts.min_font_size {
                let (w_px, h_px) = text_box(word, font);
                let (cw, ch) = (w_px.div_ceil(cell), h_px.div_ceil(cell));
                if let Some((gx, gy)) = grid.find_free(&spiral, cw, ch) {
                    grid.occupy(gx, gy, cw, ch);
                    placed = Some(PlacedWord {
                        text: word.clone(),
                        count: *count,
                        weight,
                        font_size: font,
                        x: gx * cell,
                        y: gy * cell,
                        width: w_px,
                        height: h_px,
                    });
                    break;
                }
                font -= FONT_STEP;
            }

            match placed {
                Some(p) => cloud.words.push(p),
                // Sizes only go down from here, so nothing else fits.
                None => break,
            }
            last_count = *count;
        }

        tracing::debug!(
            "word cloud placed {} of {} words",
            cloud.words.len(),
            freqs.len().min(opts.max_words)
        );
        cloud
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Render the cloud as a standalone SVG document.
    pub fn to_svg(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = self.width,
            h = self.height
        );
        let _ = writeln!(out, r#"  <rect width="100%" height="100%" fill="black"/>"#);
        for word in &self.words {
            let (r, g, b) = word.color();
            let baseline = word.y as f32 + word.font_size * 0.85;
            let _ = writeln!(
                out,
                r##"  <text x="{}" y="{:.1}" font-size="{:.1}" font-family="DejaVu Sans Mono, monospace" fill="#{:02x}{:02x}{:02x}">{}</text>"##,
                word.x,
                baseline,
                word.font_size,
                r,
                g,
                b,
                xml_escape(&word.text)
            );
        }
        out.push_str("</svg>\n");
        out
    }
}

/// Tokenize, normalize, and count words. Sorted by descending count, then
/// alphabetically.
pub fn word_frequencies(text: &str) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();

    for m in WORD_RE.find_iter(text) {
        let mut word = m.as_str().to_lowercase();
        if let Some(stripped) = word.strip_suffix("'s") {
            word = stripped.to_string();
        }
        let word = word.trim_matches('\'');
        if word.chars().count() < 2
            || STOP_WORDS.contains(word)
            || word.chars().all(|c| c.is_numeric())
        {
            continue;
        }
        *counts.entry(word.to_string()).or_insert(0) += 1;
    }

    normalize_plurals(&mut counts);

    let mut freqs: Vec<(String, usize)> = counts.into_iter().collect();
    freqs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    freqs
}

/// Fold `cats` into `cat` when both occur.
fn normalize_plurals(counts: &mut HashMap<String, usize>) {
    let plurals: Vec<String> = counts
        .keys()
        .filter(|w| w.ends_with('s') && !w.ends_with("ss"))
        .filter(|w| counts.contains_key(&w[..w.len() - 1]))
        .cloned()
        .collect();
    for plural in plurals {
        if let Some(n) = counts.remove(&plural)
            && let Some(singular) = counts.get_mut(&plural[..plural.len() - 1])
        {
            *singular += n;
        }
    }
}

fn text_box(word: &str, font: f32) -> (u32, u32) {
    let chars = word.chars().count().max(1) as f32;
    let w = (chars * font * CHAR_ASPECT).ceil() as u32;
    let h = font.ceil() as u32;
    (w.max(1), h.max(1))
}

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Coarse occupancy grid with a summed-area table for O(1) box checks.
struct OccupancyGrid {
    w: u32,
    h: u32,
    cells: Vec<bool>,
    /// `(w + 1) * (h + 1)` prefix sums of occupied cells.
    sums: Vec<u32>,
}

impl OccupancyGrid {
    fn new(w: u32, h: u32) -> Self {
        let w = w.max(1);
        let h = h.max(1);
        Self {
            w,
            h,
            cells: vec![false; (w * h) as usize],
            sums: vec![0; ((w + 1) * (h + 1)) as usize],
        }
    }

    /// Every grid cell once: first those along an elliptical Archimedean
    /// spiral from the centre, then any the spiral skipped, in row order.
    fn spiral(&self) -> Vec<(u32, u32)> {
        let total = (self.w * self.h) as usize;
        let mut seen = vec![false; total];
        let mut order = Vec::with_capacity(total);
        let (cx, cy) = (self.w as f32 / 2.0, self.h as f32 / 2.0);
        let aspect = (self.w as f32 / self.h as f32).max(1.0);
        let max_r = ((cx / aspect).powi(2) + cy.powi(2)).sqrt() + 2.0;

        let mut t = 0.0f32;
        while order.len() < total {
            let r = 0.15 * t;
            if r > max_r {
                break;
            }
            let x = cx + r * aspect * t.cos();
            let y = cy + r * t.sin();
            if x >= 0.0 && y >= 0.0 && (x as u32) < self.w && (y as u32) < self.h {
                let idx = (y as u32 * self.w + x as u32) as usize;
                if !seen[idx] {
                    seen[idx] = true;
                    order.push((x as u32, y as u32));
                }
            }
            // Smaller angular steps further out keep consecutive points adjacent.
            t += (0.8 / (1.0 + r * aspect)).min(0.5);
        }

        for (idx, _) in seen.iter().enumerate().filter(|(_, s)| !**s) {
            let idx = idx as u32;
            order.push((idx % self.w, idx / self.w));
        }
        order
    }

    fn occupied_in(&self, x: u32, y: u32, w: u32, h: u32) -> u32 {
        let stride = self.w + 1;
        let at = |xx: u32, yy: u32| self.sums[(yy * stride + xx) as usize];
        at(x + w, y + h) + at(x, y) - at(x + w, y) - at(x, y + h)
    }

    /// Top-left of the first free `w`x`h` box whose centre lies on the spiral.
    fn find_free(&self, spiral: &[(u32, u32)], w: u32, h: u32) -> Option<(u32, u32)> {
        if w > self.w || h > self.h {
            return None;
        }
        spiral.iter().find_map(|&(cx, cy)| {
            let x = cx.checked_sub(w / 2)?;
            let y = cy.checked_sub(h / 2)?;
            if x + w > self.w || y + h > self.h {
                return None;
            }
            (self.occupied_in(x, y, w, h) == 0).then_some((x, y))
        })
    }

    fn occupy(&mut self, x: u32, y: u32, w: u32, h: u32) {
        for yy in y..y + h {
            for xx in x..x + w {
                self.cells[(yy * self.w + xx) as usize] = true;
            }
        }
        self.rebuild_sums();
    }

    fn rebuild_sums(&mut self) {
        let stride = self.w + 1;
        for y in 0..self.h {
            let mut row = 0u32;
            for x in 0..self.w {
                row += self.cells[(y * self.w + x) as usize] as u32;
                let above = self.sums[(y * stride + x + 1) as usize];
                self.sums[((y + 1) * stride + x + 1) as usize] = above + row;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: &PlacedWord, b: &PlacedWord) -> bool {
        a.x < b.x + b.width && b.x < a.x + a.width && a.y < b.y + b.height && b.y < a.y + a.height
    }

    #[test]
    fn frequencies_drop_stop_words_and_numbers() {
        let freqs = word_frequencies("The cat and the hat. The cat sat in 1999 on a mat!");
        assert_eq!(freqs[0], ("cat".to_string(), 2));
        let words: Vec<&str> = freqs.iter().map(|(w, _)| w.as_str()).collect();
        assert!(!words.contains(&"the"));
        assert!(!words.contains(&"1999"));
        assert!(!words.contains(&"a"));
        assert_eq!(words, vec!["cat", "hat", "mat", "sat"]);
    }

    #[test]
    fn frequencies_fold_plurals_and_possessives() {
        let freqs = word_frequencies("cats cat Cat's class classes glass");
        assert!(freqs.contains(&("cat".to_string(), 3)));
        assert!(freqs.contains(&("class".to_string(), 1)));
        assert!(freqs.contains(&("classes".to_string(), 1)));
        assert!(freqs.contains(&("glass".to_string(), 1)));
    }

    #[test]
    fn empty_text_gives_empty_cloud() {
        let cloud = WordCloud::generate("the of and", &WordCloudOptions::default());
        assert!(cloud.is_empty());
        assert_eq!((cloud.width, cloud.height), (800, 400));
    }

    #[test]
    fn layout_is_deterministic() {
        let text = "Normans Normandy France Rollo Vikings Normans duke Normandy Normans \
                    Norse France Frankish kingdom Normans Rollo";
        let opts = WordCloudOptions::default();
        assert_eq!(WordCloud::generate(text, &opts), WordCloud::generate(text, &opts));
    }

    #[test]
    fn words_fit_canvas_without_overlap() {
        let text = (0..60)
            .map(|i| format!("word{} ", i).repeat(60 - i))
            .collect::<String>();
        let cloud = WordCloud::generate(&text, &WordCloudOptions::default());
        assert!(cloud.words.len() > 10);
        for (i, a) in cloud.words.iter().enumerate() {
            assert!(a.x + a.width <= 800, "{a:?}");
            assert!(a.y + a.height <= 400, "{a:?}");
            for b in &cloud.words[i + 1..] {
                assert!(!overlaps(a, b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn most_frequent_word_is_largest() {
        let cloud = WordCloud::generate(
            "alpha alpha alpha alpha beta beta gamma",
            &WordCloudOptions::default(),
        );
        assert_eq!(cloud.words[0].text, "alpha");
        assert_eq!(cloud.words[0].weight, 1.0);
        assert!(cloud.words[0].font_size > cloud.words[1].font_size);
        assert!(cloud.words[1].font_size > cloud.words[2].font_size);
        assert_eq!(cloud.words[0].color(), PALETTE[PALETTE.len() - 1]);
    }

    #[test]
    fn long_tail_keeps_shrinking() {
        let freqs: Vec<(String, usize)> = (0..260)
            .map(|i| (format!("term{i}"), (2000 / (i + 1)).max(1)))
            .collect();
        let cloud = WordCloud::from_frequencies(&freqs, &WordCloudOptions::default());
        assert!(cloud.words.len() > 120, "placed {}", cloud.words.len());
        assert_eq!(cloud.words[0].font_size, 120.0);
        for pair in cloud.words.windows(2) {
            assert!(pair[1].font_size <= pair[0].font_size, "{:?}", pair);
        }
    }

    #[test]
    fn max_words_is_respected() {
        let text = (0..50).map(|i| format!("w{i}x ")).collect::<String>();
        let opts = WordCloudOptions {
            max_words: 5,
            ..WordCloudOptions::default()
        };
        assert_eq!(WordCloud::generate(&text, &opts).words.len(), 5);
    }

    #[test]
    fn svg_escapes_text() {
        let cloud = WordCloud::from_frequencies(
            &[("r&d".to_string(), 3)],
            &WordCloudOptions::default(),
        );
        let svg = cloud.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("r&amp;d"));
        assert!(svg.trim_end().ends_with("</svg>"));
    }
}
