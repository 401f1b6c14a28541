//! ABI bindings for the contracts the indexer reads.

use alloy::sol;

sol! {
    interface TokenList {
        function getTokenByAddress(address _token) external view returns (address token_address, string token_template, address owner_address);
    }

    interface SecurityToken {
        event Transfer(address indexed from, address indexed to, uint256 value);
        event Lock(address indexed accountAddress, address indexed lockAddress, uint256 value, string data);
        event Unlock(address indexed accountAddress, address indexed lockAddress, address recipientAddress, uint256 value, string data);
        event Issue(address indexed from, address indexed targetAddress, address indexed lockAddress, uint256 amount);
        event Redeem(address indexed from, address indexed targetAddress, address indexed lockAddress, uint256 amount);
        event ApplyForTransfer(uint256 indexed index, address from, address to, uint256 value, string data);
        event CancelTransfer(uint256 indexed index, address from, address to, string data);
        event ApproveTransfer(uint256 indexed index, address from, address to, string data);
        event Consume(address indexed consumer, uint256 balance, uint256 used);

        function balanceOf(address account) external view returns (uint256);
        function pendingTransfer(address account) external view returns (uint256);
        function lockedOf(address lockAddress, address account) external view returns (uint256);
        function tradableExchange() external view returns (address);
    }

    interface Exchange {
        event NewOrder(address indexed tokenAddress, uint256 orderId, address indexed accountAddress, bool indexed isBuy, uint256 price, uint256 amount, address agentAddress);
        event CancelOrder(address indexed tokenAddress, uint256 orderId, address indexed accountAddress, bool indexed isBuy, uint256 price, uint256 amount, address agentAddress);
        event ForceCancelOrder(address indexed tokenAddress, uint256 orderId, address indexed accountAddress, bool indexed isBuy, uint256 price, uint256 amount, address agentAddress);
        event Agree(address indexed tokenAddress, uint256 orderId, uint256 agreementId, address indexed buyAddress, address indexed sellAddress, uint256 price, uint256 amount, address agentAddress);
        event SettlementOK(address indexed tokenAddress, uint256 orderId, uint256 agreementId, address indexed buyAddress, address indexed sellAddress, uint256 price, uint256 amount, address agentAddress);
        event SettlementNG(address indexed tokenAddress, uint256 orderId, uint256 agreementId, address indexed buyAddress, address indexed sellAddress, uint256 price, uint256 amount, address agentAddress);

        function balanceOf(address account, address token) external view returns (uint256);
        function commitmentOf(address account, address token) external view returns (uint256);
    }

    interface Escrow {
        event EscrowCreated(uint256 indexed escrowId, address indexed token, address sender, address recipient, uint256 amount, address agent, string data);
        event EscrowCanceled(uint256 indexed escrowId, address indexed token, address sender, address recipient, uint256 amount, address agent);
        event EscrowFinished(uint256 indexed escrowId, address indexed token, address sender, address recipient, uint256 amount, address agent);
        event HolderChanged(address indexed token, address indexed from, address indexed to, uint256 value);
    }

    // HolderChanged is shared with Escrow (same signature), so it is only fetched once.
    interface Dvp {
        event DeliveryCreated(uint256 indexed deliveryId, address indexed token, address seller, address buyer, uint256 amount, address agent, string data);
        event DeliveryCanceled(uint256 indexed deliveryId, address indexed token, address seller, address buyer, uint256 amount, address agent);
        event DeliveryAborted(uint256 indexed deliveryId, address indexed token, address seller, address buyer, uint256 amount, address agent);
    }
}
