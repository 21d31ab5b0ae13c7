//! Pure state transitions of the draft.
//!
//! [`DraftState::apply`] takes the current snapshot and an [`EditAction`]
//! and returns the next snapshot, or an error with the current one left as
//! it was. Nothing here performs I/O.
//!
//! # Corner-handle flips
//!
//! While a corner handle (`TL`, `TR`, `BL`, `BR`) is being dragged, the
//! opposite corner of the box stays fixed. When the pointer crosses the
//! fixed corner on an axis, the handle the user is holding has become a
//! different named corner and the mode is flipped on that axis. The x axis
//! is checked first, then the y axis against the flipped mode. A move that
//! flips only changes the mode and leaves the box as it was; the next move
//! in the new mode writes the corner.

use charpoints_core::bbox::BoundingBox;
use charpoints_core::image::ImageState;
use charpoints_core::point::Point;
use charpoints_core::validation::validate_weight;
use indexmap::IndexMap;

use crate::draft::{new_local_id, DraftState, LocalId, Pos};
use crate::error::EditError;
use crate::mode::InputMode;

/// One discrete edit of the draft.
#[derive(Debug, Clone, PartialEq)]
pub enum EditAction {
    /// Start dragging `id` in `mode`, or release it if it is already the
    /// drag target.
    ToggleDrag { id: LocalId, mode: InputMode },
    SetMode(InputMode),
    /// Pointer moved.
    Move(Pos),
    /// Create a point or box at the pointer.
    Add,
    /// Remove the element being dragged.
    Del,
    ChangeSize(u32),
    SetWeight(f64),
    SetImageState(ImageState),
    /// Set the pending label text.
    SetLabel(String),
    /// Commit the pending label text as a known label and select it.
    AddLabel,
    ToggleLabel(String),
    DelLabel(String),
    SetPredictions(Vec<BoundingBox>),
    /// Replace the ground-truth boxes with the predicted ones.
    CopyAsGt,
    /// Drop every draft point and box.
    Clear,
}

impl DraftState {
    pub fn apply(&self, action: EditAction) -> Result<DraftState, EditError> {
        let mut next = self.clone();
        match action {
            EditAction::ToggleDrag { id, mode } => next.toggle_drag(id, mode)?,
            EditAction::SetMode(mode) => next.mode = mode,
            EditAction::Move(pos) => next.move_to(pos),
            EditAction::Add => next.add(),
            EditAction::Del => next.del(),
            EditAction::ChangeSize(size) => {
                if size == 0 {
                    return Err(EditError::Validation("size must be positive".into()));
                }
                next.size = size;
            }
            EditAction::SetWeight(weight) => {
                validate_weight(weight)?;
                next.weight = weight;
            }
            EditAction::SetImageState(state) => next.image_state = state,
            EditAction::SetLabel(text) => next.pending_label = text,
            EditAction::AddLabel => next.add_label()?,
            EditAction::ToggleLabel(label) => {
                next.current_label = if next.current_label.as_deref() == Some(label.as_str()) {
                    None
                } else {
                    Some(label)
                };
            }
            EditAction::DelLabel(label) => {
                next.labels.shift_remove(&label);
                if next.current_label.as_deref() == Some(label.as_str()) {
                    next.current_label = None;
                }
            }
            EditAction::SetPredictions(boxes) => {
                next.predicted_boxes = boxes.into_iter().map(|b| (new_local_id(), b)).collect();
            }
            EditAction::CopyAsGt => {
                next.boxes = next.predicted_boxes.clone();
                next.release_if_gone();
            }
            EditAction::Clear => {
                next.points = IndexMap::new();
                next.boxes = IndexMap::new();
                next.dragging_id = None;
            }
        }
        Ok(next)
    }

    fn toggle_drag(&mut self, id: LocalId, mode: InputMode) -> Result<(), EditError> {
        if self.dragging_id == Some(id) {
            self.dragging_id = None;
            return Ok(());
        }
        let fits = if self.points.contains_key(&id) {
            mode == InputMode::Point
        } else if self.boxes.contains_key(&id) {
            mode.is_box()
        } else {
            return Err(EditError::UnknownElement(id));
        };
        if !fits {
            return Err(EditError::Validation(format!(
                "mode {mode:?} cannot drag element {id}"
            )));
        }
        self.dragging_id = Some(id);
        self.mode = mode;
        Ok(())
    }

    fn move_to(&mut self, pos: Pos) {
        self.pos = pos;
        let Some(id) = self.dragging_id else {
            return;
        };
        match self.mode {
            InputMode::Point => {
                if let Some(point) = self.points.get_mut(&id) {
                    point.x = pos.x;
                    point.y = pos.y;
                }
            }
            InputMode::Box => {}
            corner => {
                if let Some(b) = self.boxes.get_mut(&id) {
                    self.mode = drag_corner(b, corner, pos);
                }
            }
        }
    }

    fn add(&mut self) {
        let id = new_local_id();
        let pos = self.pos;
        let image_id = self.image_id.unwrap_or_default();
        if self.mode.is_box() {
            let b = BoundingBox {
                image_id,
                ..BoundingBox::at(pos.x, pos.y)
            }
            .with_label(self.current_label.clone());
            self.boxes.insert(id, b);
            self.mode = InputMode::BR;
        } else {
            let point = Point {
                image_id,
                ..Point::new(pos.x, pos.y)
            };
            self.points.insert(id, point);
        }
        self.dragging_id = Some(id);
    }

    fn del(&mut self) {
        if let Some(id) = self.dragging_id.take() {
            self.points.shift_remove(&id);
            self.boxes.shift_remove(&id);
        }
    }

    fn add_label(&mut self) -> Result<(), EditError> {
        let label = self.pending_label.trim();
        if label.is_empty() {
            return Err(EditError::Validation("label must not be empty".into()));
        }
        let label = label.to_string();
        self.labels.insert(label.clone());
        self.current_label = Some(label);
        self.pending_label.clear();
        Ok(())
    }

    fn release_if_gone(&mut self) {
        if let Some(id) = self.dragging_id {
            if !self.points.contains_key(&id) && !self.boxes.contains_key(&id) {
                self.dragging_id = None;
            }
        }
    }
}

/// Move the `corner` handle of `b` towards `pos`, returning the mode the
/// handle has after the move. `b` is untouched when the mode flips.
fn drag_corner(b: &mut BoundingBox, corner: InputMode, pos: Pos) -> InputMode {
    let mut mode = corner;
    let mut flipped = false;

    if let Some(left) = mode.is_left() {
        let crossed = if left { pos.x > b.x1 } else { pos.x < b.x0 };
        if crossed {
            mode = mode.flip_horizontal();
            flipped = true;
        }
    }

    if let Some(top) = mode.is_top() {
        let crossed = if top { pos.y > b.y1 } else { pos.y < b.y0 };
        if crossed {
            mode = mode.flip_vertical();
            flipped = true;
        }
    }

    if flipped {
        return mode;
    }

    match mode {
        InputMode::TL => {
            b.x0 = pos.x;
            b.y0 = pos.y;
        }
        InputMode::TR => {
            b.x1 = pos.x;
            b.y0 = pos.y;
        }
        InputMode::BL => {
            b.x0 = pos.x;
            b.y1 = pos.y;
        }
        InputMode::BR => {
            b.x1 = pos.x;
            b.y1 = pos.y;
        }
        InputMode::Point | InputMode::Box => {}
    }
    mode
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use charpoints_core::image::{Image, NewImage};

    fn corners(b: &BoundingBox) -> (f64, f64, f64, f64) {
        (b.x0, b.y0, b.x1, b.y1)
    }

    /// Draft with one box `(0.2, 0.2)-(0.6, 0.6)` held by `mode`.
    fn dragging_box(mode: InputMode) -> (DraftState, LocalId) {
        let id = new_local_id();
        let mut draft = DraftState::default();
        draft.boxes.insert(id, BoundingBox::new(0.2, 0.2, 0.6, 0.6));
        let draft = draft
            .apply(EditAction::ToggleDrag { id, mode })
            .unwrap();
        (draft, id)
    }

    fn step(draft: DraftState, action: EditAction) -> DraftState {
        draft.apply(action).unwrap()
    }

    // -- toggleDrag --------------------------------------------------------

    #[test]
    fn toggle_drag_sets_and_releases() {
        let (draft, id) = dragging_box(InputMode::TL);
        assert_eq!(draft.dragging_id, Some(id));
        assert_eq!(draft.mode, InputMode::TL);

        let released = step(draft, EditAction::ToggleDrag { id, mode: InputMode::BR });
        assert_eq!(released.dragging_id, None);
        assert_eq!(released.mode, InputMode::TL);
    }

    #[test]
    fn toggle_drag_unknown_id_rejected() {
        let draft = DraftState::default();
        let result = draft.apply(EditAction::ToggleDrag {
            id: new_local_id(),
            mode: InputMode::Point,
        });
        assert_matches!(result, Err(EditError::UnknownElement(_)));
    }

    #[test]
    fn toggle_drag_point_with_box_mode_rejected() {
        let id = new_local_id();
        let mut draft = DraftState::default();
        draft.points.insert(id, Point::new(0.5, 0.5));
        assert_matches!(
            draft.apply(EditAction::ToggleDrag { id, mode: InputMode::TL }),
            Err(EditError::Validation(_))
        );
    }

    // -- move --------------------------------------------------------------

    #[test]
    fn move_without_drag_only_records_position() {
        let draft = DraftState::default();
        let next = step(draft.clone(), EditAction::Move(Pos::new(0.1, 0.9)));
        assert_eq!(next.pos, Pos::new(0.1, 0.9));
        assert_eq!(next.points, draft.points);
        assert_eq!(next.boxes, draft.boxes);
    }

    #[test]
    fn move_drags_point() {
        let id = new_local_id();
        let mut draft = DraftState::default();
        draft.points.insert(id, Point::new(0.5, 0.5));
        let draft = step(draft, EditAction::ToggleDrag { id, mode: InputMode::Point });

        let next = step(draft, EditAction::Move(Pos::new(0.3, 0.7)));
        assert_eq!((next.points[&id].x, next.points[&id].y), (0.3, 0.7));
    }

    #[test]
    fn move_each_corner_without_crossing() {
        let cases = [
            (InputMode::TL, (0.1, 0.15), (0.1, 0.15, 0.6, 0.6)),
            (InputMode::TR, (0.7, 0.1), (0.2, 0.1, 0.7, 0.6)),
            (InputMode::BL, (0.1, 0.8), (0.1, 0.2, 0.6, 0.8)),
            (InputMode::BR, (0.9, 0.9), (0.2, 0.2, 0.9, 0.9)),
        ];
        for (mode, (x, y), expected) in cases {
            let (draft, id) = dragging_box(mode);
            let next = step(draft, EditAction::Move(Pos::new(x, y)));
            assert_eq!(corners(&next.boxes[&id]), expected, "{mode:?}");
            assert_eq!(next.mode, mode);
        }
    }

    #[test]
    fn top_left_crossing_right_edge_flips_to_top_right() {
        let (draft, id) = dragging_box(InputMode::TL);

        let flipped = step(draft, EditAction::Move(Pos::new(0.8, 0.4)));
        assert_eq!(flipped.mode, InputMode::TR);
        assert_eq!(flipped.pos, Pos::new(0.8, 0.4));
        // The flip frame only changes the mode.
        assert_eq!(corners(&flipped.boxes[&id]), (0.2, 0.2, 0.6, 0.6));

        let next = step(flipped, EditAction::Move(Pos::new(0.8, 0.2)));
        assert_eq!(next.mode, InputMode::TR);
        assert_eq!(corners(&next.boxes[&id]), (0.2, 0.2, 0.8, 0.6));
    }

    #[test]
    fn top_left_crossing_bottom_edge_flips_to_bottom_left() {
        let (draft, id) = dragging_box(InputMode::TL);
        let next = step(draft, EditAction::Move(Pos::new(0.3, 0.7)));
        assert_eq!(next.mode, InputMode::BL);
        assert_eq!(corners(&next.boxes[&id]), (0.2, 0.2, 0.6, 0.6));

        let next = step(next, EditAction::Move(Pos::new(0.3, 0.7)));
        assert_eq!(corners(&next.boxes[&id]), (0.3, 0.2, 0.6, 0.7));
    }

    #[test]
    fn crossing_both_axes_flips_to_opposite_corner() {
        let (draft, id) = dragging_box(InputMode::TL);
        let next = step(draft, EditAction::Move(Pos::new(0.9, 0.9)));
        assert_eq!(next.mode, InputMode::BR);
        assert_eq!(corners(&next.boxes[&id]), (0.2, 0.2, 0.6, 0.6));

        let next = step(next, EditAction::Move(Pos::new(0.9, 0.9)));
        assert_eq!(corners(&next.boxes[&id]), (0.2, 0.2, 0.9, 0.9));
    }

    #[test]
    fn every_corner_flips_the_right_way() {
        let cases = [
            (InputMode::TR, (0.1, 0.4), InputMode::TL),
            (InputMode::TR, (0.4, 0.8), InputMode::BR),
            (InputMode::BL, (0.8, 0.4), InputMode::BR),
            (InputMode::BL, (0.4, 0.1), InputMode::TL),
            (InputMode::BR, (0.1, 0.4), InputMode::BL),
            (InputMode::BR, (0.4, 0.1), InputMode::TR),
        ];
        for (mode, (x, y), expected) in cases {
            let (draft, id) = dragging_box(mode);
            let next = step(draft, EditAction::Move(Pos::new(x, y)));
            assert_eq!(next.mode, expected, "{mode:?} -> ({x}, {y})");
            assert!(next.boxes[&id].x0 <= next.boxes[&id].x1);
            assert!(next.boxes[&id].y0 <= next.boxes[&id].y1);
        }
    }

    #[test]
    fn box_never_crosses_during_a_drag() {
        let (mut draft, id) = dragging_box(InputMode::BR);
        let path = [
            (0.7, 0.7),
            (0.1, 0.7),
            (0.1, 0.7),
            (0.1, 0.05),
            (0.1, 0.05),
            (0.95, 0.95),
            (0.95, 0.95),
            (0.3, 0.3),
        ];
        for (x, y) in path {
            draft = step(draft, EditAction::Move(Pos::new(x, y)));
            let b = &draft.boxes[&id];
            assert!(b.x0 <= b.x1 && b.y0 <= b.y1, "crossed at ({x}, {y}): {b:?}");
        }
    }

    #[test]
    fn original_snapshot_is_untouched() {
        let (draft, id) = dragging_box(InputMode::BR);
        let before = draft.clone();
        let _ = draft.apply(EditAction::Move(Pos::new(0.9, 0.9))).unwrap();
        assert_eq!(draft, before);
        assert_eq!(corners(&draft.boxes[&id]), (0.2, 0.2, 0.6, 0.6));
    }

    // -- add / del ---------------------------------------------------------

    #[test]
    fn add_box_starts_bottom_right_drag() {
        let mut draft = DraftState::default();
        draft.current_label = Some("cat".into());
        let draft = step(draft, EditAction::Move(Pos::new(0.3, 0.4)));

        let draft = step(draft, EditAction::Add);
        let id = draft.dragging_id.unwrap();
        let b = &draft.boxes[&id];
        assert_eq!(corners(b), (0.3, 0.4, 0.3, 0.4));
        assert_eq!(b.label.as_deref(), Some("cat"));
        assert_eq!(draft.mode, InputMode::BR);

        // The same gesture keeps sizing the new box.
        let draft = step(draft, EditAction::Move(Pos::new(0.5, 0.6)));
        assert_eq!(corners(&draft.boxes[&id]), (0.3, 0.4, 0.5, 0.6));
    }

    #[test]
    fn add_in_corner_mode_creates_box() {
        let draft = step(DraftState::default(), EditAction::SetMode(InputMode::TL));
        let draft = step(draft, EditAction::Add);
        assert_eq!(draft.boxes.len(), 1);
        assert_eq!(draft.mode, InputMode::BR);
    }

    #[test]
    fn add_point_at_cursor() {
        let image = Image::new(NewImage::default());
        let mut draft = DraftState::default().loaded(image.clone(), vec![], vec![]);
        draft.mode = InputMode::Point;
        let draft = step(draft, EditAction::Move(Pos::new(0.25, 0.75)));

        let draft = step(draft, EditAction::Add);
        let id = draft.dragging_id.unwrap();
        assert_eq!((draft.points[&id].x, draft.points[&id].y), (0.25, 0.75));
        assert_eq!(draft.points[&id].image_id, image.id);
        assert!(draft.boxes.is_empty());
        assert_eq!(draft.mode, InputMode::Point);
    }

    #[test]
    fn del_removes_dragged_element() {
        let draft = step(DraftState::default(), EditAction::Add);
        assert_eq!(draft.boxes.len(), 1);

        let draft = step(draft, EditAction::Del);
        assert!(draft.boxes.is_empty());
        assert!(draft.dragging_id.is_none());
    }

    #[test]
    fn del_without_drag_is_noop() {
        let draft = step(DraftState::default(), EditAction::Add);
        let id = draft.dragging_id.unwrap();
        let draft = step(draft, EditAction::ToggleDrag { id, mode: InputMode::BR });
        assert!(draft.dragging_id.is_none());

        let next = step(draft, EditAction::Del);
        assert_eq!(next.boxes.len(), 1);
    }

    // -- labels ------------------------------------------------------------

    #[test]
    fn add_label_commits_pending_text() {
        let draft = step(DraftState::default(), EditAction::SetLabel("dog".into()));
        let draft = step(draft, EditAction::AddLabel);
        assert!(draft.labels.contains("dog"));
        assert_eq!(draft.current_label.as_deref(), Some("dog"));
        assert!(draft.pending_label.is_empty());
    }

    #[test]
    fn add_empty_label_rejected() {
        let draft = step(DraftState::default(), EditAction::SetLabel("  ".into()));
        assert_matches!(draft.apply(EditAction::AddLabel), Err(EditError::Validation(_)));
    }

    #[test]
    fn toggle_label_selects_and_deselects() {
        let draft = step(DraftState::default(), EditAction::ToggleLabel("cat".into()));
        assert_eq!(draft.current_label.as_deref(), Some("cat"));
        let draft = step(draft, EditAction::ToggleLabel("dog".into()));
        assert_eq!(draft.current_label.as_deref(), Some("dog"));
        let draft = step(draft, EditAction::ToggleLabel("dog".into()));
        assert!(draft.current_label.is_none());
    }

    #[test]
    fn del_label_clears_selection_when_current() {
        let mut draft = DraftState::default();
        draft.labels.extend(["cat".to_string(), "dog".to_string()]);
        draft.current_label = Some("cat".into());

        let kept = step(draft.clone(), EditAction::DelLabel("dog".into()));
        assert_eq!(kept.current_label.as_deref(), Some("cat"));

        let cleared = step(draft, EditAction::DelLabel("cat".into()));
        assert!(cleared.current_label.is_none());
        assert!(!cleared.labels.contains("cat"));
    }

    // -- setters -----------------------------------------------------------

    #[test]
    fn setters_validate() {
        let draft = DraftState::default();
        assert_eq!(step(draft.clone(), EditAction::ChangeSize(1024)).size, 1024);
        assert!(draft.apply(EditAction::ChangeSize(0)).is_err());
        assert_eq!(step(draft.clone(), EditAction::SetWeight(2.0)).weight, 2.0);
        assert_matches!(
            draft.apply(EditAction::SetWeight(f64::NAN)),
            Err(EditError::Core(_))
        );
        assert_eq!(
            step(draft, EditAction::SetImageState(ImageState::Done)).image_state,
            ImageState::Done
        );
    }

    // -- predictions / clear -----------------------------------------------

    #[test]
    fn copy_as_gt_replaces_boxes() {
        let draft = step(DraftState::default(), EditAction::Add);
        let draft = step(
            draft,
            EditAction::SetPredictions(vec![
                BoundingBox::new(0.1, 0.1, 0.2, 0.2),
                BoundingBox::new(0.3, 0.3, 0.4, 0.4),
            ]),
        );

        let draft = step(draft, EditAction::CopyAsGt);
        assert_eq!(draft.boxes, draft.predicted_boxes);
        assert_eq!(draft.boxes.len(), 2);
        assert!(draft.dragging_id.is_none());
    }

    #[test]
    fn clear_keeps_labels_and_image() {
        let image = Image::new(NewImage::default());
        let mut draft = DraftState::default().loaded(image.clone(), vec![], vec![Point::new(0.1, 0.1)]);
        draft.labels.insert("cat".into());
        let draft = step(draft, EditAction::Add);

        let draft = step(draft, EditAction::Clear);
        assert!(draft.points.is_empty());
        assert!(draft.boxes.is_empty());
        assert!(draft.dragging_id.is_none());
        assert_eq!(draft.image_id, Some(image.id));
        assert!(draft.labels.contains("cat"));
    }
}
