// Domain layer: 訂單模型、統計結果與對外的 port (trait)。

pub mod model;
pub mod ports;
