use std::collections::BTreeSet;

use log::debug;

use crate::friend::Selectable;
use crate::overlay::{OverlayHandle, RenderSurface};

/// 현재 선택된 대상(하나 또는 없음)과 열려 있는 정보창을 관리한다.
///
/// 선택은 항상 하나뿐이고, 새 정보창을 열기 전에 기존 정보창은 모두 닫는다.
#[derive(Debug, Default)]
pub struct SelectionState {
    selected: Option<Selectable>,
    open: BTreeSet<OverlayHandle>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// 이전 선택을 지우고 `entity`를 선택한다
    pub fn select<S: RenderSurface>(&mut self, entity: Selectable, surface: &mut S) {
        self.close_all_open(surface);
        self.selected = Some(entity);
    }

    /// 정보창을 하나 열고 유일하게 열린 정보창으로 기록한다
    pub fn open_info<S: RenderSurface>(
        &mut self,
        anchor: OverlayHandle,
        content: &str,
        surface: &mut S,
    ) {
        self.close_all_open(surface);
        surface.open_info_content(anchor, content);
        self.open.insert(anchor);
    }

    pub fn close_all_open<S: RenderSurface>(&mut self, surface: &mut S) {
        if !self.open.is_empty() {
            debug!("💬 정보창 {}개 닫기", self.open.len());
        }
        for handle in std::mem::take(&mut self.open) {
            surface.close_info(handle);
        }
    }

    /// 팝업 닫기: 선택 해제 + 정보창 모두 닫기
    pub fn clear_selection<S: RenderSurface>(&mut self, surface: &mut S) {
        self.selected = None;
        self.close_all_open(surface);
    }

    pub fn selected(&self) -> Option<&Selectable> {
        self.selected.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.selected.is_none()
    }

    pub fn open_overlays(&self) -> &BTreeSet<OverlayHandle> {
        &self.open
    }
}
