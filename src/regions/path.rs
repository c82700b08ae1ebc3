//! Closed polygon paths in the SVG subset `M x,y (L x,y)* Z`.
//!
//! Separators may be commas or whitespace and may be omitted next to a
//! command letter (`M1,2L3,4L5,6Z`). A coordinate pair following another pair
//! without a command is an implicit `L`.

use std::sync::LazyLock;

use ndarray::Array2;
use regex::Regex;

use crate::image_pipeline::common::error::{GonetError, Result};

static PATH_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?P<cmd>[A-Za-z])|(?P<num>[-+]?(?:\d+\.?\d*|\.\d+)(?:[eE][-+]?\d+)?)|(?P<sep>[\s,]+)|(?P<bad>.)")
        .expect("path token pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Command(char),
    Number(f64),
}

fn tokenize(path: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    for caps in PATH_TOKEN.captures_iter(path) {
        if let Some(cmd) = caps.name("cmd") {
            let letter = cmd.as_str().chars().next().unwrap_or('?');
            tokens.push(Token::Command(letter));
        } else if let Some(num) = caps.name("num") {
            let value: f64 = num
                .as_str()
                .parse()
                .map_err(|_| invalid(path, &format!("bad number {}", num.as_str())))?;
            tokens.push(Token::Number(value));
        } else if let Some(bad) = caps.name("bad") {
            return Err(invalid(path, &format!("unexpected character {:?}", bad.as_str())));
        }
    }
    Ok(tokens)
}

fn invalid(path: &str, reason: &str) -> GonetError {
    GonetError::InvalidArgument(format!("malformed path {:?}: {}", path, reason))
}

/// Vertices of a closed path, in drawing order.
pub fn parse_path(path: &str) -> Result<Vec<(f64, f64)>> {
    let tokens = tokenize(path)?;
    let mut iter = tokens.into_iter().peekable();

    match iter.next() {
        Some(Token::Command('M')) => {}
        _ => return Err(invalid(path, "must start with M")),
    }

    let mut vertices = Vec::new();
    let mut closed = false;
    loop {
        let x = match iter.next() {
            Some(Token::Number(v)) => v,
            _ => return Err(invalid(path, "expected x coordinate")),
        };
        let y = match iter.next() {
            Some(Token::Number(v)) => v,
            _ => return Err(invalid(path, "expected y coordinate")),
        };
        vertices.push((x, y));

        match iter.peek() {
            Some(Token::Number(_)) => continue,
            Some(Token::Command('L')) => {
                iter.next();
            }
            Some(Token::Command('Z')) => {
                iter.next();
                closed = true;
                break;
            }
            Some(Token::Command(c)) => {
                return Err(invalid(path, &format!("unsupported command {}", c)));
            }
            None => break,
        }
    }

    if !closed {
        return Err(invalid(path, "must end with Z"));
    }
    if iter.next().is_some() {
        return Err(invalid(path, "trailing content after Z"));
    }
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }
    if vertices.len() < 3 {
        return Err(invalid(path, "a closed path needs at least 3 distinct vertices"));
    }
    Ok(vertices)
}

/// Even-odd ray casting.
pub fn point_in_polygon(x: f64, y: f64, vertices: &[(f64, f64)]) -> bool {
    let mut inside = false;
    let mut j = vertices.len().wrapping_sub(1);
    for (i, &(xi, yi)) in vertices.iter().enumerate() {
        let (xj, yj) = vertices[j];
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Marks every pixel whose `(column, row)` lies inside the polygon.
pub fn polygon_mask(shape: (usize, usize), vertices: &[(f64, f64)]) -> Array2<bool> {
    let mut mask = Array2::from_elem(shape, false);
    if vertices.len() < 3 {
        return mask;
    }
    let (rows, cols) = shape;
    let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in vertices {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let col_range = clamp_range(min_x, max_x, cols);
    let row_range = clamp_range(min_y, max_y, rows);

    for row in row_range {
        for col in col_range.clone() {
            if point_in_polygon(col as f64, row as f64, vertices) {
                mask[[row, col]] = true;
            }
        }
    }
    mask
}

fn clamp_range(min: f64, max: f64, len: usize) -> std::ops::Range<usize> {
    if !(max >= 0.0) || len == 0 {
        return 0..0;
    }
    let start = min.max(0.0).floor() as usize;
    let end = (max.ceil() as usize).saturating_add(1).min(len);
    start.min(end)..end
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_compact_and_spaced_paths() {
        let expected = vec![(1.0, 2.0), (10.5, 2.0), (10.5, -3e1)];
        assert_eq!(parse_path("M1,2L10.5,2L10.5,-3e1Z").unwrap(), expected);
        assert_eq!(parse_path("M 1 2 L 10.5, 2 L 10.5 -30 Z").unwrap(), expected);
        assert_eq!(parse_path("M1,2 10.5,2 10.5,-30Z").unwrap(), expected);
    }

    #[test]
    fn closing_vertex_is_dropped() {
        let vertices = parse_path("M0,0L4,0L4,4L0,0Z").unwrap();
        assert_eq!(vertices.len(), 3);
    }

    #[test]
    fn malformed_paths_are_rejected() {
        for path in [
            "",
            "L1,2L3,4L5,6Z",
            "M1,2L3,4L5,6",
            "M1,2L3Z",
            "M1,2L3,4Z",
            "M1,2C3,4L5,6Z",
            "M1,2L3,4L5,6Z M0,0",
            "M1,2L3,4L5,#Z",
        ] {
            assert!(
                matches!(parse_path(path), Err(GonetError::InvalidArgument(_))),
                "{:?} should fail",
                path
            );
        }
    }

    #[test]
    fn ray_casting_on_square() {
        let square = [(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)];
        assert!(point_in_polygon(2.0, 2.0, &square));
        assert!(!point_in_polygon(5.0, 2.0, &square));
        assert!(!point_in_polygon(-0.5, 2.0, &square));
    }

    #[test]
    fn triangle_mask() {
        let triangle = parse_path("M0.5,0.5 L6.7,0.5 L0.5,6.7 Z").unwrap();
        let mask = polygon_mask((8, 8), &triangle);
        assert!(mask[[1, 1]]);
        assert!(mask[[1, 4]]);
        assert!(!mask[[5, 5]]);
        assert!(!mask[[0, 0]]);
        // pixels with col + row <= 7 and both >= 1
        let expected = (1..8)
            .flat_map(|r| (1..8).map(move |c| (r, c)))
            .filter(|(r, c)| r + c <= 7)
            .count();
        assert_eq!(mask.iter().filter(|&&v| v).count(), expected);
    }

    #[test]
    fn polygon_outside_the_plane_is_empty() {
        let mask = polygon_mask((4, 4), &[(-10.0, -10.0), (-5.0, -10.0), (-5.0, -5.0)]);
        assert!(mask.iter().all(|&v| !v));
    }
}
