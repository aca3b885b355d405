// Token-id to AST mappings.

fn binary_op_for(id: OperatorId) -> Option<BinaryOp> {
    Some(match id {
        OperatorId::OrOr => BinaryOp::Or,
        OperatorId::AndAnd => BinaryOp::And,
        OperatorId::Pipe => BinaryOp::BitOr,
        OperatorId::Caret => BinaryOp::BitXor,
        OperatorId::Amp => BinaryOp::BitAnd,
        OperatorId::EqEq => BinaryOp::Eq,
        OperatorId::NotEq => BinaryOp::NotEq,
        OperatorId::Lt => BinaryOp::Lt,
        OperatorId::LtEq => BinaryOp::LtEq,
        OperatorId::Gt => BinaryOp::Gt,
        OperatorId::GtEq => BinaryOp::GtEq,
        OperatorId::Plus => BinaryOp::Add,
        OperatorId::Minus => BinaryOp::Sub,
        OperatorId::Star => BinaryOp::Mul,
        OperatorId::Slash => BinaryOp::Div,
        OperatorId::Percent => BinaryOp::Rem,
        _ => return None,
    })
}

fn assign_op_for(id: OperatorId) -> Option<AssignOp> {
    Some(match id {
        OperatorId::Eq => AssignOp::Assign,
        OperatorId::PlusEq => AssignOp::Add,
        OperatorId::MinusEq => AssignOp::Sub,
        OperatorId::StarEq => AssignOp::Mul,
        OperatorId::SlashEq => AssignOp::Div,
        OperatorId::PercentEq => AssignOp::Rem,
        _ => return None,
    })
}

fn category_for(id: KeywordId) -> Option<NodeCategory> {
    Some(match id {
        KeywordId::Action => NodeCategory::Action,
        KeywordId::Condition => NodeCategory::Condition,
        KeywordId::Control => NodeCategory::Control,
        KeywordId::Decorator => NodeCategory::Decorator,
        KeywordId::Subtree => NodeCategory::Subtree,
        _ => return None,
    })
}

fn direction_for(id: KeywordId) -> Option<PortDirection> {
    Some(match id {
        KeywordId::In => PortDirection::In,
        KeywordId::Out => PortDirection::Out,
        KeywordId::Ref => PortDirection::Ref,
        KeywordId::Mut => PortDirection::Mut,
        _ => return None,
    })
}
