use super::*;
use crate::coords::Vec2;
use crate::input::PointerEventKind::{Click, Drag, Press, Release};
use crate::input_handler::WorldRegion;
use crate::test_support::{HandlerCall, RecordingInputHandler, RecordingViewModel, ViewModelCall};
use crate::view_model::{SpriteInfo, SpriteVisual, TileInfo, TileVisual};

fn sprite_at(id: u64, depth: i32, x: f32, y: f32) -> SpriteInfo {
    SpriteInfo {
        id: SpriteId(id),
        depth,
        screen: Vec2::new(x, y),
        visual: SpriteVisual {
            color: [200, 80, 80, 255],
            half_size_px: 4,
        },
    }
}

fn tile(x: u32, y: u32, depth: i32) -> TileInfo {
    TileInfo {
        x,
        y,
        depth,
        visual: TileVisual {
            color: [60, 90, 60, 255],
        },
    }
}

fn pointer(kind: PointerEventKind, button: PointerButton, x: f32, y: f32) -> PointerEvent {
    PointerEvent::new(kind, button, x, y)
}

fn view_with_handler(
    view_model: RecordingViewModel,
    options: ViewOptions,
) -> (WorldView<RecordingViewModel>, RecordingInputHandler) {
    let handler = RecordingInputHandler::default();
    let mut view = WorldView::create(view_model, options);
    view.set_user_input_handler(Box::new(handler.clone()));
    (view, handler)
}

fn assert_sprites_parented_by_depth(view: &WorldView<RecordingViewModel>) {
    for id in view.sprites().ids() {
        let depth = view.sprites().get(*id).expect("tracked").depth;
        let expected = view.layers().pair(depth).map(|pair| pair.sprite.id());
        assert_eq!(view.layers().sprite_parent(*id), expected, "sprite={id:?}");
    }
}

#[test]
fn create_sizes_stack_from_max_z_level() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.max_z_level = 2;
    let view = WorldView::create(view_model, ViewOptions::default());
    assert_eq!(view.max_depth(), 3);
    assert_eq!(view.layers().len(), 4);
    assert_eq!(view.root_size(), (320, 240));
}

#[test]
fn create_honors_show_underlying_override() {
    let view_model = RecordingViewModel::new(10, 0);
    let options = ViewOptions {
        show_underlying: Some(0),
        ..ViewOptions::default()
    };
    let view = WorldView::create(view_model, options);
    assert_eq!(view.max_depth(), 1);
}

#[test]
fn negative_max_z_level_keeps_one_front_layer() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.max_z_level = -4;
    let view = WorldView::create(view_model, ViewOptions::default());
    assert_eq!(view.max_depth(), 0);
    assert_eq!(view.layers().len(), 1);
}

#[test]
fn create_populates_visible_tiles_and_sprites() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.tiles = vec![tile(0, 0, 0), tile(1, 0, 1), tile(3, 2, 2)];
    view_model.sprites = vec![sprite_at(1, 0, 5.0, 5.0), sprite_at(2, 2, 15.0, 5.0)];
    let view = WorldView::create(view_model, ViewOptions::default());

    assert_eq!(view.tiles().len(), 3);
    assert!(view.layers().pair(1).expect("pair").tile.contains(1, 0));
    assert!(view.layers().pair(2).expect("pair").tile.contains(3, 2));
    assert_eq!(view.sprites().len(), 2);
    assert_sprites_parented_by_depth(&view);
}

#[test]
fn notifications_route_sprites_through_depth_changes() {
    let view_model = RecordingViewModel::new(10, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());

    view.view_model_mut().pending = vec![
        ViewModelEvent::SpriteAppeared(sprite_at(1, 0, 5.0, 5.0)),
        ViewModelEvent::SpriteAppeared(sprite_at(2, 1, 5.0, 5.0)),
        ViewModelEvent::SpriteDepthChanged {
            id: SpriteId(1),
            depth: 3,
        },
        ViewModelEvent::SpriteDepthChanged {
            id: SpriteId(2),
            depth: 9,
        },
        ViewModelEvent::SpriteMoved {
            id: SpriteId(1),
            screen: Vec2::new(40.0, 30.0),
        },
    ];
    assert_eq!(view.pump_notifications(), 5);

    assert_sprites_parented_by_depth(&view);
    assert_eq!(view.layers().sprite_parent(SpriteId(2)), None);
    assert_eq!(
        view.sprites().get(SpriteId(1)).expect("tracked").screen,
        Vec2::new(40.0, 30.0)
    );
}

#[test]
fn unknown_sprite_notifications_are_ignored() {
    let view_model = RecordingViewModel::new(10, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());
    let before = view.layers().sprite_membership();

    view.handle_view_model_event(ViewModelEvent::SpriteDepthChanged {
        id: SpriteId(42),
        depth: 0,
    });
    view.handle_view_model_event(ViewModelEvent::SpriteMoved {
        id: SpriteId(42),
        screen: Vec2::new(1.0, 1.0),
    });
    view.handle_view_model_event(ViewModelEvent::SpriteRemoved(SpriteId(42)));

    assert!(view.sprites().is_empty());
    assert_eq!(view.layers().sprite_membership(), before);
}

#[test]
fn removed_sprite_leaves_its_layer() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.sprites = vec![sprite_at(1, 1, 5.0, 5.0)];
    let mut view = WorldView::create(view_model, ViewOptions::default());

    view.handle_view_model_event(ViewModelEvent::SpriteRemoved(SpriteId(1)));
    assert!(view.sprites().get(SpriteId(1)).is_none());
    assert_eq!(view.layers().sprite_parent(SpriteId(1)), None);
}

#[test]
fn growing_max_z_level_rebuilds_and_reattaches_deep_sprites() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.max_z_level = 0;
    view_model.sprites = vec![sprite_at(1, 0, 5.0, 5.0), sprite_at(2, 3, 5.0, 5.0)];
    view_model.tiles = vec![tile(0, 0, 3)];
    let mut view = WorldView::create(view_model, ViewOptions::default());
    assert_eq!(view.max_depth(), 1);
    assert_eq!(view.layers().sprite_parent(SpriteId(2)), None);
    let old_generation = view.layers().generation();

    view.view_model_mut().max_z_level = 4;
    view.handle_view_model_event(ViewModelEvent::MaxZLevelChanged);

    assert_eq!(view.max_depth(), 5);
    assert_ne!(view.layers().generation(), old_generation);
    assert_sprites_parented_by_depth(&view);
    assert!(view.layers().pair(3).expect("pair").tile.contains(0, 0));
}

#[test]
fn shrinking_max_depth_detaches_sprites_beyond_range() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.max_z_level = 3;
    view_model.sprites = vec![sprite_at(1, 4, 5.0, 5.0), sprite_at(2, 1, 5.0, 5.0)];
    let mut view = WorldView::create(view_model, ViewOptions::default());
    assert!(view.layers().sprite_parent(SpriteId(1)).is_some());

    view.set_show_underlying(Some(1));

    assert_eq!(view.max_depth(), 2);
    assert_eq!(view.layers().sprite_parent(SpriteId(1)), None);
    assert!(view.sprites().get(SpriteId(1)).is_some());
    assert_sprites_parented_by_depth(&view);

    view.set_show_underlying(None);
    assert_eq!(view.max_depth(), 4);
    assert_sprites_parented_by_depth(&view);
}

#[test]
fn rebuild_is_all_or_nothing_for_observers() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.max_z_level = 1;
    view_model.sprites = (0..6).map(|id| sprite_at(id, id as i32 - 1, 5.0, 5.0)).collect();
    let mut view = WorldView::create(view_model, ViewOptions::default());

    let before = view.layers().sprite_membership();
    let before_generation = view.layers().generation();
    assert!(before.iter().all(|(layer, _)| layer.generation == before_generation));

    view.view_model_mut().max_z_level = 3;
    assert!(view.recompute_max_depth());

    let after = view.layers().sprite_membership();
    let after_generation = view.layers().generation();
    assert!(after.iter().all(|(layer, _)| layer.generation == after_generation));
    let expected = (0..=4)
        .map(|depth| {
            view.sprites()
                .ids()
                .iter()
                .copied()
                .filter(|id| view.sprites().get(*id).expect("tracked").depth == depth)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let actual = after
        .into_iter()
        .map(|(_, children)| children)
        .collect::<Vec<_>>();
    assert_eq!(actual, expected);
}

#[test]
fn unchanged_max_depth_does_not_rebuild() {
    let view_model = RecordingViewModel::new(10, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());
    let generation = view.layers().generation();
    assert!(!view.recompute_max_depth());
    view.handle_view_model_event(ViewModelEvent::MaxZLevelChanged);
    assert_eq!(view.layers().generation(), generation);
}

#[test]
fn clicking_front_sprite_reports_object() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.sprites = vec![sprite_at(7, 0, 50.0, 50.0)];
    let (mut view, handler) = view_with_handler(view_model, ViewOptions::default());

    let disposition = view
        .handle_pointer(&pointer(Click, PointerButton::Primary, 52.0, 49.0))
        .expect("click");
    assert_eq!(disposition, EventDisposition::Consumed);
    assert_eq!(
        *handler.calls.borrow(),
        vec![HandlerCall::Object(SpriteId(7))]
    );
}

#[test]
fn clicking_deep_sprite_falls_through_to_world_point() {
    let mut view_model = RecordingViewModel::new(10, 1);
    view_model.sprites = vec![sprite_at(7, 1, 50.0, 50.0)];
    let (mut view, handler) = view_with_handler(view_model, ViewOptions::default());

    view.handle_pointer(&pointer(Click, PointerButton::Primary, 50.0, 50.0))
        .expect("click");
    assert_eq!(
        *handler.calls.borrow(),
        vec![HandlerCall::WorldPoint {
            x: 5.0,
            y: 5.0,
            z: 1
        }]
    );
}

#[test]
fn sprite_becomes_selectable_when_it_reaches_front() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.sprites = vec![sprite_at(7, 1, 50.0, 50.0)];
    let (mut view, handler) = view_with_handler(view_model, ViewOptions::default());

    view.handle_view_model_event(ViewModelEvent::SpriteDepthChanged {
        id: SpriteId(7),
        depth: 0,
    });
    view.handle_pointer(&pointer(Click, PointerButton::Primary, 50.0, 50.0))
        .expect("click");
    assert_eq!(
        *handler.calls.borrow(),
        vec![HandlerCall::Object(SpriteId(7))]
    );
}

#[test]
fn marquee_gesture_reports_region_and_clears_rect() {
    let view_model = RecordingViewModel::new(10, 2);
    let (mut view, handler) = view_with_handler(view_model, ViewOptions::default());

    view.handle_pointer(&pointer(Press, PointerButton::Primary, 10.0, 10.0))
        .expect("press");
    view.handle_pointer(&pointer(Drag, PointerButton::Primary, 50.0, 40.0))
        .expect("drag");
    assert!(view.selection_rect().expect("rect").visible);
    view.handle_pointer(&pointer(Release, PointerButton::Primary, 50.0, 40.0))
        .expect("release");

    assert!(view.selection_rect().is_none());
    assert_eq!(
        *handler.calls.borrow(),
        vec![HandlerCall::Region(WorldRegion {
            x_min: 1.0,
            y_min: 1.0,
            z_min: 2,
            x_max: 5.0,
            y_max: 4.0,
            z_max: 3,
        })]
    );
}

#[test]
fn middle_drag_pans_view_model() {
    let view_model = RecordingViewModel::new(30, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());

    view.handle_pointer(&pointer(Press, PointerButton::Middle, 10.0, 10.0))
        .expect("press");
    view.handle_pointer(&pointer(Drag, PointerButton::Middle, 7.0, 12.0))
        .expect("drag");
    view.handle_pointer(&pointer(Release, PointerButton::Middle, 7.0, 12.0))
        .expect("release");

    assert_eq!(
        view.view_model().calls,
        vec![ViewModelCall::MoveOrigin {
            dx: 30.0,
            dy: -20.0
        }]
    );
    assert_eq!(view.input_state(), &InputState::Idle);
}

#[test]
fn scroll_pans_or_adjusts_level() {
    let view_model = RecordingViewModel::new(10, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());

    let plain = ScrollEvent {
        delta_x: 3.0,
        delta_y: -2.0,
        shift_down: false,
    };
    let shifted = ScrollEvent {
        delta_x: 1.0,
        delta_y: 0.0,
        shift_down: true,
    };
    assert_eq!(
        view.handle_scroll(&plain).expect("scroll"),
        EventDisposition::Consumed
    );
    view.handle_scroll(&shifted).expect("scroll");

    assert_eq!(
        view.view_model().calls,
        vec![
            ViewModelCall::MoveOrigin { dx: 3.0, dy: -2.0 },
            ViewModelCall::AdjustLevel { delta: 1 },
        ]
    );
}

#[test]
fn reverse_scroll_option_flips_pan() {
    let view_model = RecordingViewModel::new(10, 0);
    let options = ViewOptions {
        reverse_scroll_enabled: true,
        ..ViewOptions::default()
    };
    let mut view = WorldView::create(view_model, options);

    view.handle_scroll(&ScrollEvent {
        delta_x: 3.0,
        delta_y: -2.0,
        shift_down: false,
    })
    .expect("scroll");
    assert_eq!(
        view.view_model().calls,
        vec![ViewModelCall::MoveOrigin { dx: -3.0, dy: 2.0 }]
    );
}

#[test]
fn view_model_failure_propagates_to_caller() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.fail_with = Some("locked".to_string());
    let mut view = WorldView::create(view_model, ViewOptions::default());

    let error = view
        .handle_scroll(&ScrollEvent {
            delta_x: 1.0,
            delta_y: 1.0,
            shift_down: true,
        })
        .expect_err("should fail");
    assert_eq!(
        error,
        CollaboratorError::ViewModel {
            operation: "adjust_level",
            reason: "locked".to_string()
        }
    );
}

#[test]
fn input_handler_failure_propagates_to_caller() {
    let view_model = RecordingViewModel::new(10, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());
    view.set_user_input_handler(Box::new(RecordingInputHandler {
        fail_with: Some("busy".to_string()),
        ..RecordingInputHandler::default()
    }));

    let result = view.handle_pointer(&pointer(Click, PointerButton::Primary, 1.0, 1.0));
    assert!(matches!(
        result,
        Err(CollaboratorError::InputHandler {
            operation: "world_point_clicked",
            ..
        })
    ));
}

#[test]
fn missing_handler_still_consumes_click() {
    let view_model = RecordingViewModel::new(10, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());
    assert!(!view.has_user_input_handler());

    let disposition = view
        .handle_pointer(&pointer(Click, PointerButton::Primary, 1.0, 1.0))
        .expect("click");
    assert_eq!(disposition, EventDisposition::Consumed);
}

#[test]
fn pan_pumps_notifications_from_view_model() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.sprites = vec![sprite_at(1, 0, 5.0, 5.0)];
    let mut view = WorldView::create(view_model, ViewOptions::default());
    view.view_model_mut().pending = vec![ViewModelEvent::SpriteMoved {
        id: SpriteId(1),
        screen: Vec2::new(2.0, 3.0),
    }];

    view.handle_scroll(&ScrollEvent {
        delta_x: 3.0,
        delta_y: 0.0,
        shift_down: false,
    })
    .expect("scroll");
    assert_eq!(
        view.sprites().get(SpriteId(1)).expect("tracked").screen,
        Vec2::new(2.0, 3.0)
    );
}

#[test]
fn grid_labels_follow_tile_offset_notifications() {
    let view_model = RecordingViewModel::new(10, 0);
    let options = ViewOptions {
        grid_enabled: true,
        grid_coordinates_enabled: true,
        ..ViewOptions::default()
    };
    let mut view = WorldView::create(view_model, options);
    assert_eq!(view.grid().expect("grid").labels()[0].text(), "0,0");

    view.handle_view_model_event(ViewModelEvent::TileOffsetChanged { x: 4, y: 2 });
    assert_eq!(view.grid().expect("grid").labels()[0].text(), "4,2");
}

#[test]
fn grid_is_absent_unless_enabled() {
    let view_model = RecordingViewModel::new(10, 0);
    let view = WorldView::create(view_model, ViewOptions::default());
    assert!(view.grid().is_none());
    assert!(!view.paint_order().contains(&PaintItem::Grid));
}

#[test]
fn paint_order_is_back_to_front_with_grid_under_front_sprites() {
    let mut view_model = RecordingViewModel::new(10, 0);
    view_model.max_z_level = 0;
    let options = ViewOptions {
        grid_enabled: true,
        ..ViewOptions::default()
    };
    let view = WorldView::create(view_model, options);
    let deep = view.layers().pair(1).expect("pair");
    let front = view.layers().pair(0).expect("pair");

    assert_eq!(
        view.paint_order(),
        vec![
            PaintItem::TileLayer(deep.tile.id()),
            PaintItem::SpriteLayer(deep.sprite.id()),
            PaintItem::TileLayer(front.tile.id()),
            PaintItem::Grid,
            PaintItem::SpriteLayer(front.sprite.id()),
            PaintItem::Selection,
        ]
    );
}

#[test]
fn apply_options_updates_effects_and_grid() {
    let view_model = RecordingViewModel::new(10, 0);
    let mut view = WorldView::create(view_model, ViewOptions::default());
    assert!(view.layers().pair(1).expect("pair").tile.effect().is_none());

    view.apply_options(ViewOptions {
        darken_enabled: true,
        grid_enabled: true,
        ..ViewOptions::default()
    });

    assert!(view.layers().pair(1).expect("pair").tile.effect().is_some());
    assert!(view.layers().pair(0).expect("pair").sprite.effect().is_none());
    assert!(view.grid().is_some());
    assert!(view.grid().expect("grid").labels().is_empty());
}
