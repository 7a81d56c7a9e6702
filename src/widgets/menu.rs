/// 关闭动画时长，与样式表中的过渡一致
pub const CLOSE_TRANSITION_MS: u32 = 300;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MenuPhase {
    #[default]
    Closed,
    Open,
    /// 正在播放关闭动画，等待 `finish_close`
    Closing,
}

/// 移动端菜单
#[derive(Debug, Default)]
pub struct MobileMenu {
    phase: MenuPhase,
}

impl MobileMenu {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> MenuPhase {
        self.phase
    }

    pub fn is_open(&self) -> bool {
        self.phase == MenuPhase::Open
    }

    /// 打开菜单；返回状态是否变化
    pub fn open(&mut self) -> bool {
        if self.phase == MenuPhase::Open {
            return false;
        }
        self.phase = MenuPhase::Open;
        true
    }

    /// 开始关闭；返回 `true` 时调用方应在动画结束后调用 `finish_close`
    pub fn close(&mut self) -> bool {
        if self.phase != MenuPhase::Open {
            return false;
        }
        self.phase = MenuPhase::Closing;
        true
    }

    /// 动画结束；期间若已重新打开则保持打开
    pub fn finish_close(&mut self) -> bool {
        if self.phase != MenuPhase::Closing {
            return false;
        }
        self.phase = MenuPhase::Closed;
        true
    }

    pub fn toggle(&mut self) -> bool {
        if self.is_open() {
            self.close()
        } else {
            self.open()
        }
    }

    /// 键盘事件：打开状态下 Escape 关闭
    pub fn handle_key(&mut self, key: &str) -> bool {
        key == "Escape" && self.close()
    }
}
