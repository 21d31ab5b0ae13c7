//! One editing session: a draft plus the I/O that loads and persists it.

use std::sync::Arc;

use charpoints_core::services::Services;
use charpoints_core::types::EntityId;

use crate::draft::DraftState;
use crate::error::EditError;
use crate::events::{EditorEvent, EventBus};
use crate::transition::EditAction;

/// Owns the current [`DraftState`] of one open image.
///
/// Synchronous edits go through [`dispatch`](Self::dispatch). Only `init`,
/// `save` and `delete` touch the services; each reports its outcome on the
/// [`EventBus`] and leaves the draft untouched when it fails.
pub struct EditorSession {
    services: Services,
    events: Arc<EventBus>,
    state: DraftState,
}

impl EditorSession {
    pub fn new(services: Services, events: Arc<EventBus>) -> Self {
        Self {
            services,
            events,
            state: DraftState::default(),
        }
    }

    /// Read-only snapshot for rendering.
    pub fn state(&self) -> &DraftState {
        &self.state
    }

    pub fn events(&self) -> &Arc<EventBus> {
        &self.events
    }

    /// Apply one edit. On error the draft is unchanged.
    pub fn dispatch(&mut self, action: EditAction) -> Result<(), EditError> {
        self.state = self.state.apply(action)?;
        Ok(())
    }

    /// Load image `id` with its boxes and points into a fresh draft.
    pub async fn init(&mut self, id: EntityId) -> Result<(), EditError> {
        match self.load(id).await {
            Ok(next) => {
                tracing::info!(
                    image_id = %id,
                    boxes = next.boxes.len(),
                    points = next.points.len(),
                    "Editor initialized",
                );
                self.state = next;
                self.events.publish(EditorEvent::Initialized { image_id: id });
                Ok(())
            }
            Err(e) => Err(self.fail("init", Some(id), e)),
        }
    }

    async fn load(&self, id: EntityId) -> Result<DraftState, EditError> {
        let image = self.services.image.find(id).await?;
        let boxes = self.services.bbox.filter(Some(id)).await?;
        let points = self.services.point.filter(Some(id)).await?;
        Ok(self.state.loaded(image, boxes, points))
    }

    /// Persist the draft: boxes, then points, then the image fields.
    ///
    /// Stops at the first failure. Steps that already succeeded stay
    /// persisted; the draft is kept so the save can be retried.
    pub async fn save(&mut self) -> Result<(), EditError> {
        let image_id = self.state.image_id;
        match self.persist().await {
            Ok(id) => {
                tracing::info!(image_id = %id, "Draft saved");
                self.events.publish(EditorEvent::Saved { image_id: id });
                Ok(())
            }
            Err(e) => Err(self.fail("save", image_id, e)),
        }
    }

    async fn persist(&self) -> Result<EntityId, EditError> {
        let payload = self.state.save_payload()?;
        self.services
            .bbox
            .replace(payload.image_id, payload.boxes)
            .await?;
        self.services
            .point
            .replace(payload.image_id, payload.points)
            .await?;
        self.services.image.update(payload.image).await?;
        Ok(payload.image_id)
    }

    /// Delete the open image with all its annotations and detach the draft.
    pub async fn delete(&mut self) -> Result<EntityId, EditError> {
        let image_id = self.state.image_id;
        let result = match image_id {
            Some(id) => self.services.image.delete(id).await.map_err(EditError::from),
            None => Err(EditError::NoImageLoaded),
        };
        match result {
            Ok(id) => {
                tracing::info!(image_id = %id, "Image deleted from editor");
                self.state = self.state.detached();
                self.events.publish(EditorEvent::Deleted { image_id: id });
                Ok(id)
            }
            Err(e) => Err(self.fail("delete", image_id, e)),
        }
    }

    fn fail(&self, operation: &str, image_id: Option<EntityId>, err: EditError) -> EditError {
        tracing::warn!(operation, image_id = ?image_id, error = %err, "Editor operation failed");
        self.events
            .publish(EditorEvent::failed(operation, image_id, &err));
        err
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use charpoints_core::bbox::BoundingBox;
    use charpoints_core::error::CoreError;
    use charpoints_core::image::{ImageState, NewImage};
    use charpoints_core::lock::Lock;
    use charpoints_core::memory::MemoryStore;
    use charpoints_core::point::Point;
    use charpoints_core::types::new_id;
    use tokio::sync::broadcast;

    use crate::draft::Pos;
    use crate::mode::InputMode;

    struct Fixture {
        services: Services,
        session: EditorSession,
        rx: broadcast::Receiver<EditorEvent>,
        image_id: EntityId,
    }

    async fn fixture() -> Fixture {
        let services = Services::new(Arc::new(MemoryStore::new()), Lock::new());
        let image_id = services
            .image
            .create(NewImage {
                name: "cat.png".into(),
                data: Some("AAAA".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        services
            .bbox
            .replace(
                image_id,
                vec![BoundingBox::new(0.1, 0.1, 0.4, 0.4).with_label(Some("cat".into()))],
            )
            .await
            .unwrap();
        services
            .point
            .replace(image_id, vec![Point::new(0.5, 0.5), Point::new(0.6, 0.6)])
            .await
            .unwrap();

        let events = Arc::new(EventBus::default());
        let rx = events.subscribe();
        let session = EditorSession::new(services.clone(), events);
        Fixture {
            services,
            session,
            rx,
            image_id,
        }
    }

    #[tokio::test]
    async fn init_loads_image_and_annotations() {
        let mut f = fixture().await;
        f.session.init(f.image_id).await.unwrap();

        let state = f.session.state();
        assert_eq!(state.image_id, Some(f.image_id));
        assert_eq!(state.boxes.len(), 1);
        assert_eq!(state.points.len(), 2);
        assert_eq!(state.image_data.as_deref(), Some("AAAA"));
        assert_eq!(state.current_label.as_deref(), Some("cat"));
        assert_eq!(
            f.rx.recv().await.unwrap(),
            EditorEvent::Initialized { image_id: f.image_id }
        );
    }

    #[tokio::test]
    async fn init_missing_image_leaves_draft() {
        let mut f = fixture().await;
        f.session.init(f.image_id).await.unwrap();
        f.rx.recv().await.unwrap();
        let before = f.session.state().clone();

        let result = f.session.init(new_id()).await;
        assert_matches!(result, Err(EditError::Core(CoreError::NotFound { .. })));
        assert_eq!(f.session.state(), &before);
        assert!(f.rx.recv().await.unwrap().is_failure());
    }

    #[tokio::test]
    async fn clear_then_save_persists_empty_sets() {
        let mut f = fixture().await;
        f.session.init(f.image_id).await.unwrap();
        f.session.dispatch(EditAction::Clear).unwrap();
        f.session.save().await.unwrap();

        assert!(f.services.bbox.filter(Some(f.image_id)).await.unwrap().is_empty());
        assert!(f.services.point.filter(Some(f.image_id)).await.unwrap().is_empty());
        let image = f.services.image.find(f.image_id).await.unwrap();
        assert_eq!((image.box_count, image.point_count), (0, 0));
    }

    #[tokio::test]
    async fn save_persists_edits_and_image_fields() {
        let mut f = fixture().await;
        f.session.init(f.image_id).await.unwrap();

        // Draw a box from bottom-right to top-left; it is stored normalized.
        for action in [
            EditAction::SetMode(InputMode::Box),
            EditAction::Move(Pos::new(0.9, 0.9)),
            EditAction::Add,
            EditAction::Move(Pos::new(0.7, 0.7)),
            EditAction::Move(Pos::new(0.7, 0.7)),
            EditAction::Move(Pos::new(0.7, 0.7)),
            EditAction::SetImageState(ImageState::Done),
            EditAction::SetWeight(3.0),
        ] {
            f.session.dispatch(action).unwrap();
        }
        f.session.save().await.unwrap();

        let boxes = f.services.bbox.filter(Some(f.image_id)).await.unwrap();
        assert_eq!(boxes.len(), 2);
        let drawn = boxes
            .iter()
            .find(|b| b.label.as_deref() == Some("cat") && b.x1 > 0.8)
            .unwrap();
        assert_eq!((drawn.x0, drawn.y0, drawn.x1, drawn.y1), (0.7, 0.7, 0.9, 0.9));

        let image = f.services.image.find(f.image_id).await.unwrap();
        assert_eq!(image.state, ImageState::Done);
        assert_eq!(image.weight, 3.0);
        assert_eq!(image.data.as_deref(), Some("AAAA"));
        assert_eq!(image.box_count, 2);
    }

    #[tokio::test]
    async fn save_without_image_fails() {
        let mut f = fixture().await;
        assert_matches!(f.session.save().await, Err(EditError::NoImageLoaded));
        assert_matches!(
            f.rx.recv().await.unwrap(),
            EditorEvent::Failed { code, .. } if code == "NO_IMAGE_LOADED"
        );
    }

    #[tokio::test]
    async fn save_after_external_delete_keeps_draft() {
        let mut f = fixture().await;
        f.session.init(f.image_id).await.unwrap();
        f.session.dispatch(EditAction::Add).unwrap();
        let before = f.session.state().clone();

        f.services.image.delete(f.image_id).await.unwrap();

        let result = f.session.save().await;
        assert_matches!(result, Err(EditError::Core(CoreError::NotFound { .. })));
        assert_eq!(f.session.state(), &before);
    }

    #[tokio::test]
    async fn delete_cascades_and_detaches() {
        let mut f = fixture().await;
        f.session.init(f.image_id).await.unwrap();
        f.session.dispatch(EditAction::ChangeSize(800)).unwrap();

        let deleted = f.session.delete().await.unwrap();
        assert_eq!(deleted, f.image_id);

        let state = f.session.state();
        assert!(state.image_id.is_none());
        assert!(state.boxes.is_empty());
        assert!(state.labels.contains("cat"));
        assert_eq!(state.size, 800);

        assert!(f.services.point.filter(Some(f.image_id)).await.unwrap().is_empty());
        assert!(f.services.bbox.filter(Some(f.image_id)).await.unwrap().is_empty());

        f.rx.recv().await.unwrap();
        assert_eq!(
            f.rx.recv().await.unwrap(),
            EditorEvent::Deleted { image_id: f.image_id }
        );
    }

    #[tokio::test]
    async fn rejected_edit_keeps_state() {
        let mut f = fixture().await;
        let before = f.session.state().clone();
        assert!(f.session.dispatch(EditAction::ChangeSize(0)).is_err());
        assert_eq!(f.session.state(), &before);
    }
}
