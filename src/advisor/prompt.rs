//! Fixed conversational prompt sent to the remote advisor.

use chrono::Timelike;

use crate::model::{BossSelection, CombatWindow};

/// Build the single user message: game mode, card layout, start time, the three
/// bosses in kill order, end time, and a request to pick one card.
pub fn build_prompt(window: &CombatWindow, bosses: &BossSelection) -> String {
    let [first, second, third] = bosses.names();
    format!(
        "我在玩剑网3的试炼之地周常模式，几个boss已经打完了，现在要翻牌子。\
         一共有五张牌，从左到右依次是1、2、3、4、5号，翻到好牌就能拿到能用的装备。\
         请帮我想想现在该翻哪一张？我{}开始打，第一个boss是{first}，第二个boss是{second}，\
         第三个boss是{third}，{}打完的。帮我选一张。",
        clock(window.start),
        clock(window.end),
    )
}

/// `H:MM`, hour unpadded.
fn clock(ts: chrono::NaiveDateTime) -> String {
    format!("{}:{:02}", ts.hour(), ts.minute())
}
