//! Polyomino partitioner for the jigsaw game.
//!
//! The filled cells of a finished crossword are carved into small
//! 4-connected pieces. Partitioning starts at the most intersected cells,
//! grows pieces by BFS up to a size cap, then merges away pieces that came
//! out too small. An optional plus-shaped pentomino can be reserved around
//! one well-connected intersection.

use crate::puzzle::Placement;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

#[derive(Debug, Clone)]
pub struct PolyominoConfig {
    pub min_piece_size: usize,
    pub max_piece_size: usize,
    /// Reserve at most one 5-cell `+` piece around a fully surrounded
    /// intersection.
    pub allow_single_cross_pentomino: bool,
}

impl Default for PolyominoConfig {
    fn default() -> Self {
        Self {
            min_piece_size: 2,
            max_piece_size: 4,
            allow_single_cross_pentomino: false,
        }
    }
}

/// One cell of a piece, relative to the piece anchor.
///
/// `node` holds the block id of the adjacent filled grid cell per direction
/// (`[up, right, down, left]`), or -1 where the grid has no cell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceCell {
    pub rel_x: usize,
    pub rel_y: usize,
    pub letter: String,
    pub block_id: i32,
    pub node: [i32; 4],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Piece {
    pub id: String,
    /// Grid position of the piece's bounding-box corner.
    pub correct_x: usize,
    pub correct_y: usize,
    pub cells: Vec<PieceCell>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolyominoPuzzle {
    pub theme: String,
    pub grid_width: usize,
    pub grid_height: usize,
    pub pieces: Vec<Piece>,
    /// Advisory size-rule violations; the partition is returned regardless.
    #[serde(skip)]
    pub warnings: Vec<String>,
}

struct CellInfo {
    letter: String,
    block_id: i32,
    word_count: usize,
}

/// Neighbors in `[up, right, down, left]` order.
fn neighbors4(x: usize, y: usize) -> [(i64, i64); 4] {
    let (x, y) = (x as i64, y as i64);
    [(x, y - 1), (x + 1, y), (x, y + 1), (x - 1, y)]
}

fn registry_key(x: i64, y: i64) -> Option<(usize, usize)> {
    if x < 0 || y < 0 {
        None
    } else {
        Some((x as usize, y as usize))
    }
}

/// Partition the filled cells of `placements` into connected pieces.
pub fn generate_polyomino(
    placements: &[Placement],
    width: usize,
    height: usize,
    theme: &str,
    config: &PolyominoConfig,
) -> PolyominoPuzzle {
    // Cell registry: block ids in first-sighting order, word counts per
    // cell (intersections sight twice or more).
    let mut registry: HashMap<(usize, usize), CellInfo> = HashMap::new();
    let mut sight_order: Vec<(usize, usize)> = Vec::new();
    for placement in placements {
        for (offset, pos) in placement.positions().into_iter().enumerate() {
            match registry.get_mut(&pos) {
                Some(info) => info.word_count += 1,
                None => {
                    registry.insert(
                        pos,
                        CellInfo {
                            letter: placement.item.graphemes[offset].clone(),
                            block_id: sight_order.len() as i32,
                            word_count: 1,
                        },
                    );
                    sight_order.push(pos);
                }
            }
        }
    }

    // Most connected cells first, then top-to-bottom, left-to-right.
    let mut seeds = sight_order.clone();
    seeds.sort_by(|a, b| {
        registry[b]
            .word_count
            .cmp(&registry[a].word_count)
            .then_with(|| a.1.cmp(&b.1))
            .then_with(|| a.0.cmp(&b.0))
    });

    let mut assignment: HashMap<(usize, usize), usize> = HashMap::new();
    let mut groups: Vec<Vec<(usize, usize)>> = Vec::new();
    let mut cross_group: Option<usize> = None;

    if config.allow_single_cross_pentomino {
        for &(x, y) in seeds.iter().filter(|pos| registry[*pos].word_count >= 2) {
            let arms: Vec<(usize, usize)> = neighbors4(x, y)
                .into_iter()
                .filter_map(|(nx, ny)| registry_key(nx, ny))
                .filter(|key| registry.contains_key(key))
                .collect();
            if arms.len() == 4 {
                let group_id = groups.len();
                let mut cells = vec![(x, y)];
                cells.extend(arms);
                for cell in &cells {
                    assignment.insert(*cell, group_id);
                }
                groups.push(cells);
                cross_group = Some(group_id);
                debug!("reserved cross pentomino around ({x}, {y})");
                break;
            }
        }
    }

    // Greedy BFS partition of the remaining cells.
    for &seed in &seeds {
        if assignment.contains_key(&seed) {
            continue;
        }
        let group_id = groups.len();
        assignment.insert(seed, group_id);
        let mut cells = vec![seed];
        let mut queue = VecDeque::from([seed]);

        'grow: while cells.len() < config.max_piece_size {
            let Some((cx, cy)) = queue.pop_front() else {
                break;
            };
            for (nx, ny) in neighbors4(cx, cy) {
                let Some(key) = registry_key(nx, ny) else {
                    continue;
                };
                if registry.contains_key(&key) && !assignment.contains_key(&key) {
                    assignment.insert(key, group_id);
                    cells.push(key);
                    queue.push_back(key);
                    if cells.len() >= config.max_piece_size {
                        break 'grow;
                    }
                }
            }
        }
        groups.push(cells);
    }

    // Merge undersized pieces into their smallest legal neighbor. Redirects
    // chain, so an absorbed piece's cells follow later merges.
    let mut parent: Vec<usize> = (0..groups.len()).collect();
    let merge_limit = config.max_piece_size.max(5);

    fn find(parent: &[usize], mut g: usize) -> usize {
        while parent[g] != g {
            g = parent[g];
        }
        g
    }

    fn root_sizes(groups: &[Vec<(usize, usize)>], parent: &[usize]) -> HashMap<usize, usize> {
        let mut sizes = HashMap::new();
        for (index, cells) in groups.iter().enumerate() {
            *sizes.entry(find(parent, index)).or_insert(0) += cells.len();
        }
        sizes
    }

    for _pass in 0..10 {
        let sizes = root_sizes(&groups, &parent);
        let mut undersized: Vec<usize> = sizes
            .iter()
            .filter(|&(_, &size)| size < config.min_piece_size)
            .map(|(&root, _)| root)
            .collect();
        undersized.sort_by_key(|&root| (sizes[&root], root));
        if undersized.is_empty() {
            break;
        }

        let mut merged_any = false;
        for root in undersized {
            if find(&parent, root) != root {
                continue;
            }
            let sizes = root_sizes(&groups, &parent);
            let own_size = sizes[&root];

            let mut candidates: Vec<(usize, usize)> = Vec::new();
            for (index, cells) in groups.iter().enumerate() {
                if find(&parent, index) != root {
                    continue;
                }
                for &(x, y) in cells {
                    for (nx, ny) in neighbors4(x, y) {
                        let Some(key) = registry_key(nx, ny) else {
                            continue;
                        };
                        let Some(&neighbor_group) = assignment.get(&key) else {
                            continue;
                        };
                        let neighbor_root = find(&parent, neighbor_group);
                        if neighbor_root == root {
                            continue;
                        }
                        let combined = own_size + sizes[&neighbor_root];
                        if combined <= merge_limit
                            && !candidates.iter().any(|(_, r)| *r == neighbor_root)
                        {
                            candidates.push((sizes[&neighbor_root], neighbor_root));
                        }
                    }
                }
            }
            if let Some(&(_, target)) = candidates.iter().min() {
                parent[root] = target;
                merged_any = true;
                debug!("merged piece group {root} into {target}");
            }
        }
        if !merged_any {
            break;
        }
    }

    // Emit surviving groups in creation order.
    let mut root_cells: HashMap<usize, Vec<(usize, usize)>> = HashMap::new();
    for (index, cells) in groups.iter().enumerate() {
        root_cells
            .entry(find(&parent, index))
            .or_default()
            .extend(cells.iter().copied());
    }

    let mut pieces = Vec::new();
    let mut cross_piece_id: Option<String> = None;
    for root in 0..groups.len() {
        if find(&parent, root) != root {
            continue;
        }
        let mut cells = root_cells.remove(&root).unwrap_or_default();
        cells.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));

        let anchor_x = cells.iter().map(|&(x, _)| x).min().unwrap_or(0);
        let anchor_y = cells.first().map(|&(_, y)| y).unwrap_or(0);

        let piece_cells: Vec<PieceCell> = cells
            .iter()
            .map(|&(x, y)| {
                let info = &registry[&(x, y)];
                let node = neighbors4(x, y).map(|(nx, ny)| {
                    registry_key(nx, ny)
                        .and_then(|key| registry.get(&key))
                        .map(|n| n.block_id)
                        .unwrap_or(-1)
                });
                PieceCell {
                    rel_x: x - anchor_x,
                    rel_y: y - anchor_y,
                    letter: info.letter.clone(),
                    block_id: info.block_id,
                    node,
                }
            })
            .collect();

        let id = format!("piece_{}", pieces.len());
        if cross_group == Some(root) {
            cross_piece_id = Some(id.clone());
        }
        pieces.push(Piece {
            id,
            correct_x: anchor_x,
            correct_y: anchor_y,
            cells: piece_cells,
        });
    }

    let warnings = validate_pieces(&pieces, cross_piece_id.as_deref(), config);
    PolyominoPuzzle {
        theme: theme.to_owned(),
        grid_width: width,
        grid_height: height,
        pieces,
        warnings,
    }
}

fn validate_pieces(
    pieces: &[Piece],
    cross_piece_id: Option<&str>,
    config: &PolyominoConfig,
) -> Vec<String> {
    let mut warnings = Vec::new();
    for piece in pieces {
        let size = piece.cells.len();
        if size < config.min_piece_size {
            warnings.push(format!(
                "{} has {size} cell(s), below the minimum of {}",
                piece.id, config.min_piece_size
            ));
        }
        if size > config.max_piece_size && size != 5 {
            warnings.push(format!(
                "{} has {size} cells, above the maximum of {}",
                piece.id, config.max_piece_size
            ));
        }
        if size == 5 && cross_piece_id != Some(piece.id.as_str()) {
            warnings.push(format!(
                "{} is a five-cell piece outside the cross pentomino rule",
                piece.id
            ));
        }
    }
    let five_count = pieces.iter().filter(|p| p.cells.len() == 5).count();
    if five_count > 1 {
        warnings.push(format!(
            "{five_count} five-cell pieces present, at most one is allowed"
        ));
    }
    warnings
}
